//! Instruction templates sent alongside the rasterised CV.
//!
//! Centralising every prompt here keeps the wording in one place and lets unit
//! tests inspect the rendered text without calling a model. Each builder is a
//! pure interpolation: no branches, no escaping beyond producing plain text.
//!
//! The score extractor in [`crate::pipeline::score`] depends on the model's
//! phrasing, not on these templates; changing the scholarship wording does
//! not change what is parsed.

use crate::application::ScholarshipApplication;

/// Instruction given to the model ahead of a scholarship file.
pub const SCHOLARSHIP_SYSTEM_TEXT: &str = "Vous êtes membre d'un jury d'attribution de bourses d'études. \
Vous évaluez chaque dossier avec rigueur et équité à partir du CV joint et des informations fournies.";

/// Template for the résumé/job matching analysis.
///
/// `{job_description}` is replaced with the pasted job offer.
pub const MATCHING_TEMPLATE: &str = r#"
Analysez le matching entre ce CV et la description du poste suivante.
Fournissez une analyse détaillée avec :
1. Un score sur 100
2. Les points forts du candidat
3. Les points à améliorer
4. Les mots-clés manquants

Description du poste:
{job_description}

Format de réponse souhaité:
Score: [X/100]
Points forts:
- [point 1]
- [point 2]
Points à améliorer:
- [point 1]
- [point 2]
Mots-clés manquants:
- [mot-clé 1]
- [mot-clé 2]
"#;

/// Template for rewriting the résumé for the job.
pub const OPTIMIZATION_TEMPLATE: &str = r#"
Optimisez ce CV pour le poste suivant. Assurez-vous de :
1. Mettre en avant les compétences pertinentes
2. Utiliser les mots-clés de la description
3. Adapter l'expérience aux exigences du poste
4. Maintenir un format professionnel
5. Optimiser pour les systèmes ATS

Description du poste:
{job_description}

Fournissez uniquement le CV optimisé, sans explications supplémentaires.
"#;

/// Render the matching-analysis prompt.
pub fn matching_prompt(job_description: &str) -> String {
    MATCHING_TEMPLATE.replace("{job_description}", job_description)
}

/// Render the résumé-optimisation prompt.
pub fn optimization_prompt(job_description: &str) -> String {
    OPTIMIZATION_TEMPLATE.replace("{job_description}", job_description)
}

/// Render the scholarship-evaluation prompt.
///
/// Arguments are substituted once, so user text holding `{income}` stays
/// literal.
pub fn scholarship_prompt(application: &ScholarshipApplication) -> String {
    format!(
        r#"
Évaluez cette candidature à une bourse d'études à partir du CV joint et des informations suivantes.

Niveau d'études: {education_level}
Revenu mensuel de la famille: {income}
Lettre de motivation:
{motivation}

Tenez compte du parcours académique, du besoin financier et de la qualité de la motivation.
Donnez une note sur 100, puis justifiez-la en quelques phrases.
"#,
        education_level = application.education_level.as_str(),
        income = application.income,
        motivation = application.motivation,
    )
}
