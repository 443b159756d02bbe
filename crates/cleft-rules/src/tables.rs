//! Classification tables.
//!
//! Static knowledge about which hooks, globals and modules tie a file to one
//! side of the client/server boundary:
//!
//! | Table | Meaning |
//! |---|---|
//! | client-only hooks | state/effect/lifecycle hooks that need a browser render |
//! | server-safe hooks | memoization/identity/ref hooks valid on either side |
//! | browser globals | identifiers that only exist in a browser |
//! | client packages | modules whose import alone makes a file client-side |
//! | server-only APIs | framework request/cache APIs (cookies, headers, ...) |
//! | node-only APIs | Node runtime modules (fs, path, crypto, os, ...) |
//!
//! The defaults can be extended with [`TableOverrides`]. Lists are
//! concatenated with the defaults; the one explicit override is that a hook
//! listed as server-safe by the project stops being client-only.

use rustc_hash::{FxHashMap, FxHashSet};

use cleft_config::TableOverrides;

/// Wildcard export marker: "every export of the module".
pub const WILDCARD: &str = "*";

pub const CLIENT_ONLY_HOOKS: &[&str] = &[
    "useState",
    "useEffect",
    "useLayoutEffect",
    "useInsertionEffect",
    "useReducer",
    "useImperativeHandle",
    "useSyncExternalStore",
    "useTransition",
    "useDeferredValue",
    "useOptimistic",
    "useActionState",
    "useFormState",
    "useFormStatus",
    "useRouter",
    "usePathname",
    "useSearchParams",
    "useParams",
    "useSelectedLayoutSegment",
    "useSelectedLayoutSegments",
];

pub const SERVER_SAFE_HOOKS: &[&str] = &[
    "useMemo",
    "useCallback",
    "useId",
    "useRef",
    "useContext",
    "useDebugValue",
];

pub const BROWSER_GLOBALS: &[&str] = &[
    "window",
    "document",
    "navigator",
    "localStorage",
    "sessionStorage",
    "location",
    "history",
    "screen",
    "alert",
    "confirm",
    "prompt",
    "matchMedia",
    "getComputedStyle",
    "requestAnimationFrame",
    "cancelAnimationFrame",
    "requestIdleCallback",
    "cancelIdleCallback",
    "IntersectionObserver",
    "ResizeObserver",
    "MutationObserver",
    "indexedDB",
    "customElements",
];

/// Client-only packages. An entry ending in `/` matches by prefix, any other
/// entry matches the exact specifier or one of its subpaths.
pub const CLIENT_PACKAGES: &[&str] = &[
    "react-dom/client",
    "framer-motion",
    "motion/react",
    "@react-three/",
    "react-hot-toast",
    "react-toastify",
    "swr",
    "zustand",
    "jotai",
    "@tanstack/react-query",
    "react-use",
    "@headlessui/react",
    "@radix-ui/",
    "react-leaflet",
    "leaflet",
    "recharts",
    "chart.js",
    "react-chartjs-2",
];

pub const SERVER_ONLY_APIS: &[(&str, &[&str])] = &[
    ("next/headers", &["cookies", "headers", "draftMode"]),
    (
        "next/cache",
        &["revalidatePath", "revalidateTag", "unstable_cache", "unstable_noStore"],
    ),
    (
        "fs/promises",
        &[
            "readFile", "writeFile", "appendFile", "readdir", "stat", "mkdir", "rm", "unlink",
            "access", "open",
        ],
    ),
    ("server-only", &[WILDCARD]),
];

pub const NODE_ONLY_APIS: &[(&str, &[&str])] = &[
    (
        "fs",
        &[
            "readFileSync",
            "writeFileSync",
            "appendFileSync",
            "existsSync",
            "readdirSync",
            "statSync",
            "mkdirSync",
            "rmSync",
            "createReadStream",
            "createWriteStream",
            "readFile",
            "writeFile",
            "promises",
        ],
    ),
    (
        "path",
        &[
            "join", "resolve", "dirname", "basename", "extname", "relative", "normalize", "sep",
        ],
    ),
    ("process", &["env", "cwd", "exit", "argv", "platform"]),
    (
        "crypto",
        &[
            "randomBytes",
            "createHash",
            "createHmac",
            "createCipheriv",
            "createDecipheriv",
            "scryptSync",
            "pbkdf2Sync",
        ],
    ),
    (
        "os",
        &["homedir", "tmpdir", "hostname", "platform", "cpus", "totalmem", "freemem"],
    ),
    ("child_process", &[WILDCARD]),
];

/// How the tables classify a hook name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookClass {
    ClientOnly,
    ServerSafe,
    Unknown,
}

/// Which runtime-restricted table an API belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestrictedApi {
    ServerOnly,
    NodeOnly,
}

/// `useX` naming convention: `use` followed by an uppercase letter.
pub fn is_hook_name(name: &str) -> bool {
    name.strip_prefix("use")
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_ascii_uppercase())
}

/// Strip the `node:` scheme so `node:fs` and `fs` share one table entry.
pub fn normalize_module(specifier: &str) -> &str {
    specifier.strip_prefix("node:").unwrap_or(specifier)
}

#[derive(Debug, Clone)]
pub struct ClassificationTables {
    client_only_hooks: FxHashSet<String>,
    server_safe_hooks: FxHashSet<String>,
    browser_globals: FxHashSet<String>,
    client_packages: Vec<String>,
    server_only_apis: FxHashMap<String, Vec<String>>,
    node_only_apis: FxHashMap<String, Vec<String>>,
    shared_modules: FxHashSet<String>,
}

fn owned<C: FromIterator<String>>(names: &[&str]) -> C {
    names.iter().map(|name| (*name).to_string()).collect()
}

fn api_map(entries: &[(&str, &[&str])]) -> FxHashMap<String, Vec<String>> {
    entries
        .iter()
        .map(|(module, apis)| ((*module).to_string(), owned(apis)))
        .collect()
}

impl Default for ClassificationTables {
    fn default() -> Self {
        Self {
            client_only_hooks: owned(CLIENT_ONLY_HOOKS),
            server_safe_hooks: owned(SERVER_SAFE_HOOKS),
            browser_globals: owned(BROWSER_GLOBALS),
            client_packages: owned(CLIENT_PACKAGES),
            server_only_apis: api_map(SERVER_ONLY_APIS),
            node_only_apis: api_map(NODE_ONLY_APIS),
            shared_modules: FxHashSet::default(),
        }
    }
}

impl ClassificationTables {
    /// Built-in tables extended with project overrides.
    pub fn with_overrides(overrides: &TableOverrides) -> Self {
        let mut tables = Self::default();
        tables.merge(overrides);
        tables
    }

    /// Concatenate override lists onto the current tables.
    pub fn merge(&mut self, overrides: &TableOverrides) {
        self.client_packages
            .extend(overrides.client_modules.iter().cloned());

        for module in &overrides.server_modules {
            self.server_only_apis
                .insert(module.clone(), vec![WILDCARD.to_string()]);
        }

        self.shared_modules
            .extend(overrides.shared_modules.iter().cloned());

        self.client_only_hooks
            .extend(overrides.client_only_hooks.iter().cloned());

        for hook in &overrides.server_safe_hooks {
            self.client_only_hooks.remove(hook);
            self.server_safe_hooks.insert(hook.clone());
        }
    }

    pub fn hook_class(&self, name: &str) -> HookClass {
        if self.client_only_hooks.contains(name) {
            HookClass::ClientOnly
        } else if self.server_safe_hooks.contains(name) {
            HookClass::ServerSafe
        } else {
            HookClass::Unknown
        }
    }

    pub fn is_browser_global(&self, name: &str) -> bool {
        self.browser_globals.contains(name)
    }

    /// The client package entry matching `specifier`, if any.
    pub fn client_package(&self, specifier: &str) -> Option<&str> {
        self.client_packages
            .iter()
            .find(|package| {
                if package.ends_with('/') {
                    specifier.starts_with(package.as_str())
                } else {
                    specifier == package.as_str()
                        || specifier
                            .strip_prefix(package.as_str())
                            .is_some_and(|rest| rest.starts_with('/'))
                }
            })
            .map(String::as_str)
    }

    /// Whether `api` imported from `module` is restricted to the server.
    pub fn restricted_api(&self, module: &str, api: &str) -> Option<RestrictedApi> {
        let module = normalize_module(module);
        let listed = |apis: &Vec<String>| apis.iter().any(|a| a == WILDCARD || a == api);

        if self.server_only_apis.get(module).is_some_and(listed) {
            Some(RestrictedApi::ServerOnly)
        } else if self.node_only_apis.get(module).is_some_and(listed) {
            Some(RestrictedApi::NodeOnly)
        } else {
            None
        }
    }

    /// Whether importing `module` for its side effects marks a server file.
    pub fn is_server_marker_module(&self, module: &str) -> bool {
        self.server_only_apis
            .get(normalize_module(module))
            .is_some_and(|apis| apis.iter().any(|a| a == WILDCARD))
    }

    pub fn is_shared(&self, module: &str) -> bool {
        self.shared_modules.contains(module)
    }

    pub fn browser_global_names(&self) -> impl Iterator<Item = &str> {
        self.browser_globals.iter().map(String::as_str)
    }

    pub fn client_only_hook_names(&self) -> impl Iterator<Item = &str> {
        self.client_only_hooks.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hook_naming_convention() {
        assert!(is_hook_name("useState"));
        assert!(is_hook_name("useX"));
        assert!(!is_hook_name("use"));
        assert!(!is_hook_name("user"));
        assert!(!is_hook_name("usefulThing"));
        assert!(!is_hook_name("reuseState"));
    }

    #[test]
    fn default_hook_classes() {
        let tables = ClassificationTables::default();
        assert_eq!(tables.hook_class("useState"), HookClass::ClientOnly);
        assert_eq!(tables.hook_class("useId"), HookClass::ServerSafe);
        assert_eq!(tables.hook_class("useMyThing"), HookClass::Unknown);
    }

    #[test]
    fn defaults_carry_every_listed_name() {
        let tables = ClassificationTables::default();
        assert_eq!(tables.client_packages.len(), CLIENT_PACKAGES.len());
        assert_eq!(tables.server_only_apis.len(), SERVER_ONLY_APIS.len());
        assert_eq!(tables.node_only_apis["fs"].len(), NODE_ONLY_APIS[0].1.len());
        assert!(BROWSER_GLOBALS.iter().all(|name| tables.is_browser_global(name)));
        assert!(tables.shared_modules.is_empty());
    }

    #[test]
    fn client_packages_match_exact_subpath_and_prefix() {
        let tables = ClassificationTables::default();
        assert_eq!(tables.client_package("swr"), Some("swr"));
        assert_eq!(tables.client_package("swr/infinite"), Some("swr"));
        assert_eq!(tables.client_package("swrx"), None);
        assert_eq!(
            tables.client_package("@radix-ui/react-dialog"),
            Some("@radix-ui/")
        );
        assert_eq!(tables.client_package("react"), None);
    }

    #[test]
    fn restricted_apis_normalize_node_scheme() {
        let tables = ClassificationTables::default();
        assert_eq!(
            tables.restricted_api("next/headers", "cookies"),
            Some(RestrictedApi::ServerOnly)
        );
        assert_eq!(
            tables.restricted_api("node:fs", "readFileSync"),
            Some(RestrictedApi::NodeOnly)
        );
        assert_eq!(
            tables.restricted_api("child_process", "spawn"),
            Some(RestrictedApi::NodeOnly)
        );
        assert_eq!(tables.restricted_api("next/headers", "other"), None);
        assert!(tables.is_server_marker_module("server-only"));
        assert!(!tables.is_server_marker_module("next/headers"));
    }

    #[test]
    fn overrides_concatenate_with_defaults() {
        let overrides = TableOverrides {
            client_modules: vec!["@acme/charts".into()],
            server_modules: vec!["@acme/db".into()],
            shared_modules: vec!["@acme/utils".into()],
            client_only_hooks: vec!["useWindowSize".into()],
            server_safe_hooks: vec!["useTranslations".into()],
        };
        let tables = ClassificationTables::with_overrides(&overrides);

        assert_eq!(tables.client_package("@acme/charts"), Some("@acme/charts"));
        assert_eq!(tables.client_package("swr"), Some("swr"));
        assert_eq!(
            tables.restricted_api("@acme/db", "query"),
            Some(RestrictedApi::ServerOnly)
        );
        assert!(tables.is_shared("@acme/utils"));
        assert_eq!(tables.hook_class("useWindowSize"), HookClass::ClientOnly);
        assert_eq!(tables.hook_class("useState"), HookClass::ClientOnly);
        assert_eq!(tables.hook_class("useTranslations"), HookClass::ServerSafe);
    }

    #[test]
    fn server_safe_override_demotes_client_hook() {
        let overrides = TableOverrides {
            server_safe_hooks: vec!["useRouter".into()],
            ..TableOverrides::default()
        };
        let tables = ClassificationTables::with_overrides(&overrides);
        assert_eq!(tables.hook_class("useRouter"), HookClass::ServerSafe);
    }
}
