//! Property tests for the line parser.

use parknet_bridge::{parse_line, SlotReading};
use proptest::prelude::*;

proptest! {
    #[test]
    fn occupied_lines_parse(
        slot in 1u32..,
        whole in 0u32..1000,
        frac in 0u32..10,
        pad in "[ \t]{0,3}",
    ) {
        let line = format!("{pad}S{slot}:{pad}{whole}.{frac}{pad}cm{pad}→{pad}OC{pad}");
        prop_assert_eq!(parse_line(&line), Some(SlotReading::new(slot, true)));
    }

    #[test]
    fn free_lines_parse(slot in 1u32.., whole in 0u32..1000, frac in 0u32..100) {
        let line = format!("S{slot}: {whole}.{frac} cm → FR");
        prop_assert_eq!(parse_line(&line), Some(SlotReading::new(slot, false)));
    }

    #[test]
    fn other_tokens_never_parse(slot in 1u32.., token in "[A-Za-z]{1,4}|-{1,3}") {
        prop_assume!(token != "OC" && token != "FR");
        let line = format!("S{slot}: 12.0 cm → {token}");
        prop_assert_eq!(parse_line(&line), None);
    }

    #[test]
    fn punctuation_after_token_is_ignored(slot in 1u32.., punct in "[.,;:!|)]{1,3}") {
        let line = format!("S{slot}: 12.0 cm → OC{punct}");
        prop_assert_eq!(parse_line(&line), Some(SlotReading::new(slot, true)));
    }

    #[test]
    fn parsing_is_deterministic(line in ".{0,64}") {
        prop_assert_eq!(parse_line(&line), parse_line(&line));
    }
}
