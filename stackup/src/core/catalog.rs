//! Built-in feature catalog.
//!
//! Declaration order here is the tie-breaker for chain ordering, so keep
//! providers ahead of the features that require them.

use crate::core::artifact::Artifact;
use crate::core::feature::{CommandSpec, FeatureDescriptor, StepAction, StepSpec};
use crate::core::manifest::ManifestPatch;
use crate::core::state::Flag;

macro_rules! template {
    ($path:literal) => {
        include_str!(concat!("../templates/", $path))
    };
}

const fn write(name: &'static str, path: &'static str, template: &'static str) -> StepSpec {
    StepSpec::new(name, StepAction::WriteArtifact(Artifact::new(path, template)))
}

const fn add(name: &'static str, packages: &'static [&'static str], dev: bool) -> StepSpec {
    StepSpec::new(
        name,
        StepAction::InstallPackages(CommandSpec::Add { packages, dev }),
    )
}

const fn scripts(name: &'static str, entries: &'static [(&'static str, &'static str)]) -> StepSpec {
    StepSpec::new(name, StepAction::PatchManifest(ManifestPatch::scripts(entries)))
}

/// Merged into any manifest already present; `name` and friends are only
/// filled in when missing.
const CORE_MANIFEST: ManifestPatch = ManifestPatch {
    fields: &[
        ("name", "{{ project_name | tojson }}"),
        ("version", "\"0.1.0\""),
        ("private", "true"),
    ],
    scripts: &[
        ("dev", "next dev"),
        ("build", "next build"),
        ("start", "next start"),
        ("lint", "next lint"),
    ],
    dependencies: &[
        ("next", "^15.1.0"),
        ("react", "^19.0.0"),
        ("react-dom", "^19.0.0"),
    ],
    dev_dependencies: &[
        ("@types/node", "^22.10.0"),
        ("@types/react", "^19.0.0"),
        ("@types/react-dom", "^19.0.0"),
        ("typescript", "^5.7.0"),
    ],
};

pub const CORE: FeatureDescriptor = FeatureDescriptor {
    name: "core",
    summary: "Next.js base project with TypeScript",
    requires: &[],
    conflict_flag: Flag::BaseProject,
    steps: &[
        StepSpec::new("patch-manifest", StepAction::PatchManifest(CORE_MANIFEST)),
        write("write-next-config", "next.config.mjs", template!("core/next.config.mjs")),
        write("write-tsconfig", "tsconfig.json", template!("core/tsconfig.json")),
        write("write-root-layout", "src/app/layout.tsx", template!("core/layout.tsx")),
        write("write-home-page", "src/app/page.tsx", template!("core/page.tsx")),
        StepSpec::new(
            "install-dependencies",
            StepAction::InstallPackages(CommandSpec::InstallAll),
        ),
    ],
};

pub const DATABASE: FeatureDescriptor = FeatureDescriptor {
    name: "database",
    summary: "Prisma ORM with a generated client",
    requires: &[Flag::BaseProject],
    conflict_flag: Flag::Database,
    steps: &[
        add("install-client", &["@prisma/client"], false),
        write("write-schema", "prisma/schema.prisma", template!("database/schema.prisma")),
        add("install-cli", &["prisma"], true),
        StepSpec::new(
            "generate-client",
            StepAction::InstallPackages(CommandSpec::Exec("prisma generate")),
        ),
        write("write-db-client", "src/lib/db.ts", template!("database/db.ts")),
        scripts(
            "patch-scripts",
            &[
                ("db:generate", "prisma generate"),
                ("db:push", "prisma db push"),
                ("db:migrate", "prisma migrate dev"),
                ("db:studio", "prisma studio"),
            ],
        ),
    ],
};

pub const AUTH: FeatureDescriptor = FeatureDescriptor {
    name: "auth",
    summary: "Auth.js sessions backed by the Prisma adapter",
    requires: &[Flag::BaseProject, Flag::Database],
    conflict_flag: Flag::Authentication,
    steps: &[
        add("install-auth", &["next-auth@beta", "@auth/prisma-adapter"], false),
        write("write-auth-config", "src/auth.ts", template!("auth/auth.ts")),
        write(
            "write-auth-route",
            "src/app/api/auth/[...nextauth]/route.ts",
            template!("auth/route.ts"),
        ),
        write("write-middleware", "src/middleware.ts", template!("auth/middleware.ts")),
    ],
};

pub const PAYMENTS: FeatureDescriptor = FeatureDescriptor {
    name: "payments",
    summary: "Stripe checkout and webhook handling",
    requires: &[Flag::Authentication],
    conflict_flag: Flag::Payments,
    steps: &[
        add("install-stripe", &["stripe"], false),
        write("write-stripe-client", "src/lib/stripe.ts", template!("payments/stripe.ts")),
        write(
            "write-checkout-route",
            "src/app/api/checkout/route.ts",
            template!("payments/checkout_route.ts"),
        ),
        write(
            "write-webhook-route",
            "src/app/api/webhooks/stripe/route.ts",
            template!("payments/webhook_route.ts"),
        ),
        scripts(
            "patch-scripts",
            &[(
                "stripe:listen",
                "stripe listen --forward-to localhost:3000/api/webhooks/stripe",
            )],
        ),
    ],
};

pub const TEAMS: FeatureDescriptor = FeatureDescriptor {
    name: "teams",
    summary: "Team membership, roles and invitations",
    requires: &[Flag::Authentication, Flag::Database],
    conflict_flag: Flag::TeamManagement,
    steps: &[
        write("write-team-service", "src/lib/teams.ts", template!("teams/teams.ts")),
        write("write-teams-page", "src/app/teams/page.tsx", template!("teams/page.tsx")),
        write(
            "write-teams-route",
            "src/app/api/teams/route.ts",
            template!("teams/teams_route.ts"),
        ),
        write(
            "write-invites-route",
            "src/app/api/teams/[teamId]/invites/route.ts",
            template!("teams/invites_route.ts"),
        ),
    ],
};

pub const TESTING: FeatureDescriptor = FeatureDescriptor {
    name: "testing",
    summary: "Vitest with React Testing Library",
    requires: &[Flag::BaseProject],
    conflict_flag: Flag::Testing,
    steps: &[
        add(
            "install-test-tooling",
            &["vitest", "@vitejs/plugin-react", "@testing-library/react", "jsdom"],
            true,
        ),
        write("write-vitest-config", "vitest.config.ts", template!("testing/vitest.config.ts")),
        write(
            "write-smoke-test",
            "src/__tests__/smoke.test.tsx",
            template!("testing/smoke.test.tsx"),
        ),
        scripts(
            "patch-scripts",
            &[("test", "vitest run"), ("test:watch", "vitest")],
        ),
    ],
};

pub const I18N: FeatureDescriptor = FeatureDescriptor {
    name: "i18n",
    summary: "next-intl message catalogs",
    requires: &[Flag::BaseProject],
    conflict_flag: Flag::I18n,
    steps: &[
        add("install-next-intl", &["next-intl"], false),
        write("write-request-config", "src/i18n.ts", template!("i18n/i18n.ts")),
        write(
            "write-messages",
            "messages/{{ default_locale }}.json",
            template!("i18n/messages.json"),
        ),
    ],
};

pub const EDITOR_CONFIG: FeatureDescriptor = FeatureDescriptor {
    name: "editor-config",
    summary: "EditorConfig and Prettier formatting",
    requires: &[Flag::BaseProject],
    conflict_flag: Flag::EditorConfig,
    steps: &[
        write("write-editorconfig", ".editorconfig", template!("editor_config/editorconfig")),
        write(
            "write-prettier-config",
            ".prettierrc.json",
            template!("editor_config/prettierrc.json"),
        ),
        add("install-prettier", &["prettier"], true),
        scripts(
            "patch-scripts",
            &[
                ("format", "prettier --write ."),
                ("format:check", "prettier --check ."),
            ],
        ),
    ],
};

pub const ENV_CONFIG: FeatureDescriptor = FeatureDescriptor {
    name: "env-config",
    summary: "Typed environment variables with t3-env and zod",
    requires: &[Flag::BaseProject],
    conflict_flag: Flag::EnvConfig,
    steps: &[
        add("install-env-validation", &["@t3-oss/env-nextjs", "zod"], false),
        write("write-env-schema", "src/env.ts", template!("env_config/env.ts")),
        write("write-env-example", ".env.example", template!("env_config/env.example")),
    ],
};

/// Every built-in feature, in declaration order.
pub fn builtin_features() -> Vec<FeatureDescriptor> {
    vec![
        CORE,
        DATABASE,
        AUTH,
        PAYMENTS,
        TEAMS,
        TESTING,
        I18N,
        EDITOR_CONFIG,
        ENV_CONFIG,
    ]
}
