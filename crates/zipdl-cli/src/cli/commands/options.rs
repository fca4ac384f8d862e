//! `zipdl options show|set` – inspect and change persisted options.

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use zipdl_core::options::{AppOption, JsonFileBackend, OptionsStore};

/// Option names accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OptionKey {
    Theme,
    ShowControlPanel,
    DisabledExtensions,
}

/// Turns a CLI key/value into an option change. Empty values clear the option.
pub fn parse_option(key: OptionKey, value: &str) -> Result<AppOption> {
    let value = value.trim();
    let option = match key {
        OptionKey::Theme => AppOption::Theme((!value.is_empty()).then(|| value.to_string())),
        OptionKey::ShowControlPanel => {
            let flag = match value {
                "" => None,
                "true" | "yes" | "on" | "1" => Some(true),
                "false" | "no" | "off" | "0" => Some(false),
                other => bail!("show-control-panel expects true or false, got {other:?}"),
            };
            AppOption::ShowControlPanel(flag)
        }
        OptionKey::DisabledExtensions => {
            let list: Vec<String> = value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
            AppOption::DisabledExtensions((!list.is_empty()).then_some(list))
        }
    };
    Ok(option)
}

pub fn run_options_show() -> Result<()> {
    let backend = JsonFileBackend::open_default()?;
    let store = OptionsStore::load(backend);
    let json = serde_json::to_string_pretty(store.get()).context("serialize options")?;
    println!("{json}");
    Ok(())
}

pub fn run_options_set(key: OptionKey, value: &str) -> Result<()> {
    let option = parse_option(key, value)?;
    let backend = JsonFileBackend::open_default()?;
    let mut store = OptionsStore::load(backend);
    if store.set(option)? {
        println!("Saved options to {}", store.backend().path().display());
    } else {
        println!("Options unchanged.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_value_and_clear() {
        assert_eq!(
            parse_option(OptionKey::Theme, "dark").unwrap(),
            AppOption::Theme(Some("dark".into()))
        );
        assert_eq!(parse_option(OptionKey::Theme, "  ").unwrap(), AppOption::Theme(None));
    }

    #[test]
    fn show_control_panel_accepts_bools() {
        assert_eq!(
            parse_option(OptionKey::ShowControlPanel, "yes").unwrap(),
            AppOption::ShowControlPanel(Some(true))
        );
        assert_eq!(
            parse_option(OptionKey::ShowControlPanel, "0").unwrap(),
            AppOption::ShowControlPanel(Some(false))
        );
        assert!(parse_option(OptionKey::ShowControlPanel, "maybe").is_err());
    }

    #[test]
    fn disabled_extensions_comma_list() {
        assert_eq!(
            parse_option(OptionKey::DisabledExtensions, "a, b,,c").unwrap(),
            AppOption::DisabledExtensions(Some(vec!["a".into(), "b".into(), "c".into()]))
        );
        assert_eq!(
            parse_option(OptionKey::DisabledExtensions, "").unwrap(),
            AppOption::DisabledExtensions(None)
        );
    }
}
