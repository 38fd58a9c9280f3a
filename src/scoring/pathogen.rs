//! Pathogen correlation from the fungal-growth observation
//!
//! Visible fungal growth points at fungal pathogens. Its explicit absence
//! leans towards viral or bacterial causes. An unknown observation scores
//! nothing.

use crate::types::{AilmentRecord, DiagnosisRequest, FungalGrowth, PathogenType};

pub const FUNGAL_GROWTH_POINTS: u32 = 2;
pub const NO_GROWTH_POINTS: u32 = 1;

pub fn pathogen_points(ailment: &AilmentRecord, request: &DiagnosisRequest) -> u32 {
    match (request.fungal_growth, ailment.pathogen_type) {
        (FungalGrowth::Present, PathogenType::Fungal) => FUNGAL_GROWTH_POINTS,
        (FungalGrowth::Absent, PathogenType::Viral) => NO_GROWTH_POINTS,
        (FungalGrowth::Absent, PathogenType::Bacterial) => NO_GROWTH_POINTS,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_pathogen(pathogen: PathogenType) -> AilmentRecord {
        let mut ailment = AilmentRecord::new(1, 1, "Test");
        ailment.pathogen_type = pathogen;
        ailment
    }

    fn observed(growth: FungalGrowth) -> DiagnosisRequest {
        DiagnosisRequest::for_crop("Rice").with_fungal_growth(growth)
    }

    #[test]
    fn test_growth_present() {
        let request = observed(FungalGrowth::Present);
        assert_eq!(pathogen_points(&with_pathogen(PathogenType::Fungal), &request), 2);
        assert_eq!(pathogen_points(&with_pathogen(PathogenType::Viral), &request), 0);
        assert_eq!(pathogen_points(&with_pathogen(PathogenType::Bacterial), &request), 0);
    }

    #[test]
    fn test_growth_absent() {
        let request = observed(FungalGrowth::Absent);
        assert_eq!(pathogen_points(&with_pathogen(PathogenType::Fungal), &request), 0);
        assert_eq!(pathogen_points(&with_pathogen(PathogenType::Viral), &request), 1);
        assert_eq!(pathogen_points(&with_pathogen(PathogenType::Bacterial), &request), 1);
        assert_eq!(pathogen_points(&with_pathogen(PathogenType::Nematode), &request), 0);
    }

    #[test]
    fn test_growth_unknown_scores_nothing() {
        let request = observed(FungalGrowth::Unknown);
        for pathogen in [
            PathogenType::Fungal,
            PathogenType::Bacterial,
            PathogenType::Viral,
            PathogenType::Unknown,
        ] {
            assert_eq!(pathogen_points(&with_pathogen(pathogen), &request), 0);
        }
    }
}
