//! Reference scenario runs.
//!
//! Each module builds one literal patient case, runs it through a real
//! `RecommendationEngine` over the fixture knowledge base, and (in its
//! tests) checks the case against its documented expected output.

pub mod bacteremia_mrsa_anaphylaxis;
pub mod febrile_uti;
pub mod intra_abdominal_anaphylaxis;
pub mod meningitis;
pub mod pregnant_pyelonephritis_anaphylaxis;
pub mod pyelonephritis_no_allergy;
