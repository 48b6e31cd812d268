//! What counts as proof that a flag holds.
//!
//! A flag is true when any one of its evidence items is observed. Package
//! evidence matches a key under `dependencies` or `devDependencies`; path
//! evidence is relative to the project root.

use serde::Serialize;

use crate::core::state::Flag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Evidence {
    Package(&'static str),
    File(&'static str),
    Dir(&'static str),
}

pub fn evidence_for(flag: Flag) -> &'static [Evidence] {
    use Evidence::{Dir, File, Package};

    match flag {
        Flag::BaseProject => &[
            Package("next"),
            File("next.config.mjs"),
            File("next.config.js"),
            File("next.config.ts"),
        ],
        Flag::Database => &[
            Package("@prisma/client"),
            Package("prisma"),
            File("prisma/schema.prisma"),
        ],
        Flag::Authentication => &[Package("next-auth"), File("src/auth.ts")],
        Flag::Payments => &[Package("stripe"), File("src/lib/stripe.ts")],
        Flag::TeamManagement => &[File("src/lib/teams.ts"), Dir("src/app/teams")],
        Flag::Testing => &[
            Package("vitest"),
            Package("jest"),
            File("vitest.config.ts"),
            File("jest.config.js"),
        ],
        Flag::I18n => &[Package("next-intl"), File("src/i18n.ts"), Dir("messages")],
        Flag::EditorConfig => &[File(".editorconfig")],
        Flag::EnvConfig => &[
            Package("@t3-oss/env-nextjs"),
            File("src/env.ts"),
            File(".env.example"),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_flag_has_evidence() {
        for flag in Flag::ALL {
            assert!(!evidence_for(flag).is_empty(), "{flag} has no evidence");
        }
    }

    #[test]
    fn editor_config_is_file_only() {
        assert_eq!(
            evidence_for(Flag::EditorConfig),
            &[Evidence::File(".editorconfig")]
        );
    }
}
