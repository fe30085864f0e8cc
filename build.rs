// build.rs
//
// Generates the `t!` macro from `locales/<lang>.toml`. Keys missing from the selected language
// fall back to `locales/en.toml`; a key missing from both is a compile error at the call site.

use std::collections::BTreeMap;
use std::env;
use std::error::Error;
use std::fs;
use std::path::Path;

const FALLBACK_LANG: &str = "en";

type Table = BTreeMap<String, String>;

fn main() -> Result<(), Box<dyn Error>> {
    println!("cargo:rerun-if-env-changed=ATEXPAND_LANG");
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=locales/");

    let lang = selected_lang();
    let mut table = read_table(FALLBACK_LANG)?;
    if lang != FALLBACK_LANG {
        match read_table(&lang) {
            Ok(overrides) => table.extend(overrides),
            Err(e) => println!(
                "cargo:warning=Locale '{}' unavailable ({}); using '{}'.",
                lang, e, FALLBACK_LANG
            ),
        }
    }

    let out_dir = env::var("OUT_DIR")?;
    fs::write(Path::new(&out_dir).join("translations.rs"), render_macro(&table))?;
    Ok(())
}

/// A `lang_*` feature wins over `ATEXPAND_LANG`; with several features the first by name wins.
fn selected_lang() -> String {
    let mut features: Vec<String> = env::vars()
        .filter_map(|(key, _)| {
            key.strip_prefix("CARGO_FEATURE_LANG_")
                .map(str::to_lowercase)
        })
        .collect();
    features.sort();

    if features.len() > 1 {
        println!(
            "cargo:warning=Several language features enabled ({}); using '{}'.",
            features.join(", "),
            features.first().map_or("", String::as_str)
        );
    }

    features
        .into_iter()
        .next()
        .or_else(|| env::var("ATEXPAND_LANG").ok())
        .unwrap_or_else(|| FALLBACK_LANG.to_string())
}

fn read_table(lang: &str) -> Result<Table, Box<dyn Error>> {
    let path = format!("locales/{}.toml", lang);
    let content = fs::read_to_string(&path).map_err(|e| format!("{}: {}", path, e))?;
    let table = toml::from_str(&content).map_err(|e| format!("{}: {}", path, e))?;
    Ok(table)
}

fn render_macro(table: &Table) -> String {
    let mut code = String::from(
        "/// Looks up a user-facing string by key.\n#[macro_export]\nmacro_rules! t {\n",
    );
    for (key, value) in table {
        // `{:?}` yields a valid Rust string literal for any text.
        code.push_str(&format!("    ({:?}) => {{ {:?} }};\n", key, value));
    }
    code.push_str(
        "    ($key:expr) => {{ compile_error!(concat!(\"Missing translation key: \", $key)) }};\n}\n",
    );
    code
}
