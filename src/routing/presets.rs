//! Built-in rule lists.
//!
//! The application ships with a handful of routing policies that differ only in
//! which rules precede the shell fallback. They are expanded into ordinary
//! `RuleConfig`s so they go through the same compilation and validation path as
//! rules written by hand.

use crate::config::{ActionKind, MatchKind, Preset, RewriteConfig, RuleConfig};

/// Any path whose last segment ends in `.css`, `.js` or `.wasm`; group 1 is that segment.
pub const STATIC_ASSET_PATTERN: &str = r"(?:.*/)?([^/]*\.(?:css|js|wasm))";

/// A skyway room: 24 characters of `[A-Za-z0-9@#]`.
pub const SKYWAY_ROOM_PATTERN: &str = r"/rooms/skyway/([A-Za-z0-9@#]{24})";

/// A drive room: letters, digits, `-` and `_`.
pub const DRIVE_ROOM_PATTERN: &str = r"/rooms/drive/([A-Za-z0-9_-]+)";

/// Rules contributed by a preset, in evaluation order.
pub fn preset_rules(preset: Preset) -> Vec<RuleConfig> {
    match preset {
        Preset::None => Vec::new(),
        Preset::StaticAssets => vec![static_asset_rule()],
        Preset::Rooms => vec![
            room_rule("skyway-room", SKYWAY_ROOM_PATTERN),
            room_rule("drive-room", DRIVE_ROOM_PATTERN),
            static_asset_rule(),
        ],
    }
}

/// Custom rules followed by the preset's rules.
pub fn expand_rules(config: &RewriteConfig) -> Vec<RuleConfig> {
    let mut rules = config.rules.clone();
    rules.extend(preset_rules(config.preset));
    rules
}

fn static_asset_rule() -> RuleConfig {
    RuleConfig {
        name: "static-asset".to_string(),
        kind: MatchKind::Regex,
        from: STATIC_ASSET_PATTERN.to_string(),
        action: ActionKind::Capture,
        to: Some("/${1}".to_string()),
        case_insensitive: false,
    }
}

// The room identifier is checked by shape only and then dropped.
fn room_rule(name: &str, pattern: &str) -> RuleConfig {
    RuleConfig {
        name: name.to_string(),
        kind: MatchKind::Regex,
        from: pattern.to_string(),
        action: ActionKind::Fixed,
        to: Some("/".to_string()),
        case_insensitive: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::rule::RuleSet;

    #[test]
    fn test_every_preset_compiles() {
        for preset in [Preset::None, Preset::StaticAssets, Preset::Rooms] {
            let rules = preset_rules(preset);
            assert!(RuleSet::compile(&rules).is_ok(), "preset {preset} failed to compile");
        }
    }

    #[test]
    fn test_rooms_preset_order() {
        let names: Vec<_> = preset_rules(Preset::Rooms)
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["skyway-room", "drive-room", "static-asset"]);
    }

    #[test]
    fn test_custom_rules_come_first() {
        let config = RewriteConfig {
            preset: Preset::StaticAssets,
            fallback: "/".to_string(),
            rules: vec![RuleConfig {
                name: "mine".to_string(),
                kind: MatchKind::Exact,
                from: "/x".to_string(),
                action: ActionKind::Pass,
                to: None,
                case_insensitive: false,
            }],
        };

        let names: Vec<_> = expand_rules(&config).into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["mine", "static-asset"]);
    }
}
