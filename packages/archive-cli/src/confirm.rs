//! Confirmation policy, independent of how the answer is collected.

/// Phrase that must be typed to start an archive run.
pub const CONFIRMATION_PHRASE: &str = "popx";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Proceed,
    Abort,
}

/// Proceed when confirmations are skipped or the typed answer is exactly the
/// confirmation phrase. Only a trailing line ending is tolerated.
pub fn decide(skip: bool, typed: Option<&str>) -> Decision {
    if skip {
        return Decision::Proceed;
    }
    match typed {
        Some(answer) if answer.trim_end_matches(['\r', '\n']) == CONFIRMATION_PHRASE => {
            Decision::Proceed
        }
        _ => Decision::Abort,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_flag_always_proceeds() {
        assert_eq!(decide(true, None), Decision::Proceed);
        assert_eq!(decide(true, Some("nope")), Decision::Proceed);
    }

    #[test]
    fn exact_phrase_proceeds() {
        assert_eq!(decide(false, Some("popx")), Decision::Proceed);
        assert_eq!(decide(false, Some("popx\n")), Decision::Proceed);
        assert_eq!(decide(false, Some("popx\r\n")), Decision::Proceed);
    }

    #[test]
    fn surrounding_spaces_abort() {
        assert_eq!(decide(false, Some("  popx ")), Decision::Abort);
        assert_eq!(decide(false, Some(" popx\n")), Decision::Abort);
    }

    #[test]
    fn anything_else_aborts() {
        assert_eq!(decide(false, None), Decision::Abort);
        assert_eq!(decide(false, Some("")), Decision::Abort);
        assert_eq!(decide(false, Some("POPX")), Decision::Abort);
        assert_eq!(decide(false, Some("popx!")), Decision::Abort);
    }
}
