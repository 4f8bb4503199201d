// service/progress.rs
use crate::models::constructionmodel::Phase;

/// Completion percentage for a phase, linear in its position along
/// `Phase::ALL`: `round((index + 1) / len * 100)`.
pub fn progress_percent(phase: Phase) -> u8 {
    let step = (phase.index() + 1) as f64 / Phase::ALL.len() as f64;
    (step * 100.0).round() as u8
}

/// Same as `progress_percent` for raw input. Unknown phases report 0.
pub fn progress_for(raw_phase: &str) -> u8 {
    Phase::parse(raw_phase).map(progress_percent).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_table() {
        let table: Vec<u8> = Phase::ALL.iter().map(|p| progress_percent(*p)).collect();
        assert_eq!(table, vec![17, 33, 50, 67, 83, 100]);
    }

    #[test]
    fn monotonic_along_lifecycle() {
        let mut last = 0;
        for phase in Phase::ALL {
            let pct = progress_percent(phase);
            assert!(pct >= last, "{:?} went backwards", phase);
            last = pct;
        }
        assert_eq!(progress_percent(Phase::Completed), 100);
        assert!(progress_percent(Phase::Planning) > 0);
    }

    #[test]
    fn raw_input_is_case_insensitive_and_never_fails() {
        assert_eq!(progress_for("Foundation"), 33);
        assert_eq!(progress_for(" completed "), 100);
        assert_eq!(progress_for("demolition"), 0);
        assert_eq!(progress_for(""), 0);
    }
}
