use proptest::prelude::*;
use watchtask::task::{Flags, base_name, parse_flags};

#[test]
fn plain_name_has_no_flags() {
    assert_eq!(parse_flags("build"), (Flags::default(), "build"));
}

#[test]
fn single_flag_characters() {
    let (flags, base) = parse_flags("lint?");
    assert_eq!(base, "lint");
    assert!(flags.optional && !flags.multi);

    let (flags, base) = parse_flags("codegen+");
    assert_eq!(base, "codegen");
    assert!(flags.multi && !flags.optional);

    let (flags, base) = parse_flags("gen*");
    assert_eq!(base, "gen");
    assert!(flags.multi && flags.optional);
}

#[test]
fn flag_order_does_not_matter() {
    assert_eq!(parse_flags("a?+"), parse_flags("a+?"));
    assert_eq!(parse_flags("a?+").0, Flags { multi: true, optional: true });
}

#[test]
fn scan_stops_at_first_non_flag_character() {
    let (flags, base) = parse_flags("a+b?");
    assert_eq!(base, "a+b");
    assert_eq!(flags, Flags { multi: false, optional: true });
}

#[test]
fn all_flag_name_collapses_to_empty_base() {
    let (flags, base) = parse_flags("?+*");
    assert_eq!(base, "");
    assert!(flags.multi && flags.optional);

    assert_eq!(parse_flags(""), (Flags::default(), ""));
}

#[test]
fn union_combines_edge_and_task_flags() {
    let edge = Flags { multi: true, optional: false };
    let task = Flags { multi: false, optional: true };
    assert_eq!(edge.union(task), Flags { multi: true, optional: true });
}

proptest! {
    #[test]
    fn suffix_flags_are_decoded(base in "[a-z][a-z0-9_.-]{0,10}", suffix in "[?+*]{0,4}") {
        let name = format!("{base}{suffix}");
        let (flags, parsed) = parse_flags(&name);

        prop_assert_eq!(parsed, base.as_str());
        prop_assert_eq!(base_name(&name), base.as_str());
        prop_assert_eq!(flags.optional, suffix.contains('?') || suffix.contains('*'));
        prop_assert_eq!(flags.multi, suffix.contains('+') || suffix.contains('*'));
    }
}
