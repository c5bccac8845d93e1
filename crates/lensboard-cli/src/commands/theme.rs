use super::Context;
use anyhow::Result;
use clap::ValueEnum;
use lensboard_core::config::ThemeMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ThemeAction {
    Light,
    Dark,
    Toggle,
}

pub fn run(ctx: &Context, action: Option<ThemeAction>) -> Result<()> {
    let theme = match action {
        None => ctx.preferences.theme,
        Some(ThemeAction::Light) => ctx.store.set_theme(ThemeMode::Light)?,
        Some(ThemeAction::Dark) => ctx.store.set_theme(ThemeMode::Dark)?,
        Some(ThemeAction::Toggle) => ctx.store.toggle_theme()?,
    };

    println!("Theme: {theme}");
    Ok(())
}
