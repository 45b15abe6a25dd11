//! Command handler implementations
//!
//! This module contains the implementation of all CLI commands.

use crate::app::{AppController, RenderInstruction, StatusLevel};
use crate::audit::{audit, AuditReport};
use crate::cli::{Args, Commands, ConfigCommands, PaletteCommands, ThemeCommands};
use crate::color::model::{contrast_ratio, ColorFormats};
use crate::color::{Color, ColorVision, CssNamedColors};
use crate::core::config::{get_config_path, init_config, Config};
use crate::core::error::ThemeError;
use crate::core::storage::{JsonFileStore, KeyValueStore};
use crate::messaging::{Action, BackgroundService, Clipboard, Response, SystemClipboard};
use crate::page::{scan_page, PageDump, Rect};
use crate::palette::quantizer::palette_from_image;
use crate::palette::{generate, generate_scheme, ColorHistory, HarmonyScheme, PaletteStore};
use crate::theme::applier::ApplyOptions;
use crate::theme::export::{palettes_to_json, themes_to_json, write_export, SharePayload};
use crate::theme::store::{Theme, ThemeStore};
use anyhow::{bail, Context, Result};
use dialoguer::Confirm;
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Run the appropriate command based on CLI arguments
pub fn run_command(args: &Args, config: &Config) -> Result<()> {
    match &args.command {
        Commands::Convert { color } => convert_color(color)?,
        Commands::Contrast { first, second } => show_contrast(first, second)?,
        Commands::Generate { base, scheme, json } => {
            generate_palettes(base, *scheme, *json, config.palette.default_scheme)?;
        }
        Commands::Quantize { image, k } => {
            quantize_image(image, k.unwrap_or(config.palette.default_colors))?;
        }
        Commands::Audit { colors, json } => audit_colors(colors, *json, config)?,
        Commands::Scan { page, json } => scan_page_file(page, *json)?,
        Commands::Simulate { color, vision } => simulate_color(color, *vision)?,
        Commands::Theme { command } => run_theme_command(command, config)?,
        Commands::Palette { command } => run_palette_command(command, config)?,
        Commands::Config { command } => match command {
            ConfigCommands::Path => show_config_path(),
            ConfigCommands::Show => show_config(config),
            ConfigCommands::Generate { output } => generate_config_file(output.clone())?,
        },
    }

    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

/// Parse any CSS color the way a page scan would
fn parse_color(value: &str) -> Result<Color> {
    Color::parse(value, &CssNamedColors)
        .ok_or_else(|| ThemeError::InvalidColor(value.to_string()).into())
}

/// Open the configured key-value store
fn open_store(config: &Config) -> Arc<dyn KeyValueStore> {
    debug!("Using storage file: {}", config.storage.path.display());
    Arc::new(JsonFileStore::new(&config.storage.path))
}

/// Load a JSON page dump
pub fn load_page(path: &Path) -> Result<PageDump> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read page file {}", path.display()))?;
    let page = PageDump::from_json(&content)
        .with_context(|| format!("Failed to parse page file {}", path.display()))?;
    debug!("Loaded {} elements from {}", page.len(), path.display());
    Ok(page)
}

/// Ask before a destructive action unless `yes` was passed
fn confirm(prompt: &str, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .context("Failed to read input")
}

/// Print a JSON document to stdout or write it to `output`
fn emit_json(json: &str, output: Option<&PathBuf>) -> Result<()> {
    match output {
        Some(path) => {
            write_export(path, json)?;
            info!("Exported to: {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

/// Turn a controller status into a command result
fn finish(render: RenderInstruction) -> Result<()> {
    if let RenderInstruction::Status { level, message } = render {
        if level == StatusLevel::Error {
            bail!(message);
        }
        info!("{}", message);
    }
    Ok(())
}

// ============================================================================
// Color tools
// ============================================================================

/// Show a color in every format
pub fn convert_color(value: &str) -> Result<()> {
    let color = parse_color(value)?;
    let formats = ColorFormats::of(&color);
    println!("HEX:  {}", formats.hex);
    println!("RGB:  {}", formats.rgb);
    println!("HSL:  {}", formats.hsl);
    println!("CMYK: {}", formats.cmyk);
    Ok(())
}

/// Show the contrast of two colors
pub fn show_contrast(first: &str, second: &str) -> Result<()> {
    let a = parse_color(first)?;
    let b = parse_color(second)?;
    let report = audit(&[a.hex.clone(), b.hex.clone()]);
    let ratio = contrast_ratio(&a.hex, &b.hex);

    println!("{} on {}: {:.2}:1", a.hex, b.hex, ratio);
    if let Some(pair) = report.results.first() {
        println!("  {} ({})", pair.wcag.status(), pair.level());
        println!(
            "  AA  normal: {:<5}  large: {}",
            pair.wcag.aa.normal, pair.wcag.aa.large
        );
        println!(
            "  AAA normal: {:<5}  large: {}",
            pair.wcag.aaa.normal, pair.wcag.aaa.large
        );
    }
    Ok(())
}

/// Print harmonic palettes of `base`. The configured default scheme is starred.
pub fn generate_palettes(
    base: &str,
    scheme: Option<HarmonyScheme>,
    json: bool,
    default_scheme: HarmonyScheme,
) -> Result<()> {
    let base = parse_color(base)?;

    match scheme {
        Some(scheme) => {
            let colors = generate_scheme(&base.hex, scheme);
            if json {
                println!("{}", serde_json::to_string_pretty(&colors)?);
            } else {
                println!("{:<20} {}", scheme.to_string(), colors.join(" "));
            }
        }
        None => {
            let palettes = generate(&base.hex);
            if json {
                println!("{}", serde_json::to_string_pretty(&palettes)?);
            } else {
                for (scheme, colors) in palettes.iter() {
                    let marker = if scheme == default_scheme { '*' } else { ' ' };
                    println!("{}{:<20} {}", marker, scheme.to_string(), colors.join(" "));
                }
            }
        }
    }
    Ok(())
}

/// Print the dominant colors of an image
pub fn quantize_image(path: &Path, k: usize) -> Result<()> {
    info!("Extracting {} colors from {}", k, path.display());
    let colors = palette_from_image(path, k)
        .with_context(|| format!("Failed to load image {}", path.display()))?;
    for color in colors {
        println!("{}", color);
    }
    Ok(())
}

fn print_audit(report: &AuditReport, show_passing: bool) {
    for result in &report.results {
        if !show_passing && result.passes_aa() {
            continue;
        }
        println!(
            "  {} / {}  {:>5.2}:1  {:<10} {}",
            result.color1,
            result.color2,
            result.contrast_ratio,
            result.level().to_string(),
            result.wcag.status()
        );
    }

    let failing = report.failing().count();
    match report.overall_score_percent {
        Some(score) => println!(
            "\nOverall score: {}% ({} of {} combinations fail AA)",
            score,
            failing,
            report.results.len()
        ),
        None => println!("\nNothing to audit"),
    }
}

/// Audit a color set
pub fn audit_colors(colors: &[String], json: bool, config: &Config) -> Result<()> {
    let hexes: Vec<String> = colors
        .iter()
        .map(|value| match Color::parse(value, &CssNamedColors) {
            Some(color) => color.hex,
            None => {
                warn!("Unrecognized color '{}', auditing as black", value);
                value.clone()
            }
        })
        .collect();

    let report = audit(&hexes);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_audit(&report, config.audit.show_passing);
    }
    Ok(())
}

/// Scan a page dump
pub fn scan_page_file(path: &Path, json: bool) -> Result<()> {
    let page = load_page(path)?;
    let result = scan_page(&page);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("Colors ({}):", result.colors.len());
    for color in &result.colors {
        println!("  {}  {}", color.hex, color.original.as_deref().unwrap_or(""));
    }
    println!("Fonts ({}):", result.fonts.len());
    for font in &result.fonts {
        println!("  {} {} {} {}", font.name, font.size, font.weight, font.style);
    }
    Ok(())
}

/// Show how a color reads with color vision deficiencies
pub fn simulate_color(value: &str, vision: Option<ColorVision>) -> Result<()> {
    let color = parse_color(value)?;
    let visions = match vision {
        Some(vision) => vec![vision],
        None => ColorVision::ALL.to_vec(),
    };
    for vision in visions {
        println!("{:<14} {}", vision.to_string(), vision.simulate_color(&color).hex);
    }
    Ok(())
}

// ============================================================================
// Themes
// ============================================================================

fn print_theme(theme: &Theme) {
    println!("{} [{}] created {}", theme.name, theme.id, theme.created_at);
    if !theme.colors.is_empty() {
        let hexes: Vec<&str> = theme.colors.iter().map(|c| c.hex.as_str()).collect();
        println!("  colors: {}", hexes.join(" "));
    }
    for font in &theme.fonts {
        println!("  font:   {} {} {} {}", font.name, font.size, font.weight, font.style);
    }
}

/// Run a `theme` subcommand
pub fn run_theme_command(command: &ThemeCommands, config: &Config) -> Result<()> {
    let mut themes = ThemeStore::load(open_store(config)).context("Failed to load saved themes")?;

    match command {
        ThemeCommands::Save { name, colors, page } => match page {
            Some(page) => {
                let page = load_page(page)?;
                let mut app = AppController::new(themes);
                app.extract(&page);
                app.select_all_colors();
                app.select_all_fonts();
                finish(app.save_theme(name))?;
                info!("Theme \"{}\" saved successfully!", name.trim());
            }
            None => {
                let colors = colors
                    .iter()
                    .map(|c| parse_color(c))
                    .collect::<Result<Vec<_>>>()?;
                let theme = themes.save(name, colors, Vec::new())?;
                info!("Theme \"{}\" saved successfully! (id {})", theme.name, theme.id);
            }
        },
        ThemeCommands::List => {
            if themes.is_empty() {
                println!("No saved themes yet");
            }
            for theme in themes.list() {
                println!(
                    "{:>14}  {:<24} {} colors, {} fonts",
                    theme.id,
                    theme.name,
                    theme.colors.len(),
                    theme.fonts.len()
                );
            }
        }
        ThemeCommands::Show { id } => {
            let theme = themes.get(*id).ok_or(ThemeError::ThemeNotFound(*id))?;
            print_theme(theme);
        }
        ThemeCommands::Apply {
            id,
            page,
            no_background,
            no_text,
            no_buttons,
        } => {
            let mut page = load_page(page)?;
            let options = ApplyOptions {
                apply_to_background: !no_background,
                apply_to_text: !no_text,
                apply_to_buttons: !no_buttons,
            };
            let mut app = AppController::new(themes);
            finish(app.view_theme(*id))?;
            app.select_all_theme_colors();
            app.select_all_theme_fonts();
            finish(app.apply_selected(&mut page, options))?;
        }
        ThemeCommands::Delete { id, yes } => {
            let name = themes
                .get(*id)
                .map(|t| t.name.clone())
                .ok_or(ThemeError::ThemeNotFound(*id))?;
            if !confirm(&format!("Are you sure you want to delete theme \"{}\"?", name), *yes)? {
                info!("Cancelled");
                return Ok(());
            }
            themes.delete(*id)?;
            info!("Theme deleted successfully!");
        }
        ThemeCommands::Clear { yes } => {
            if !confirm(
                "Are you sure you want to delete all saved themes? This cannot be undone.",
                *yes,
            )? {
                info!("Cancelled");
                return Ok(());
            }
            let count = themes.len();
            themes.clear_all()?;
            info!("Deleted {} themes", count);
        }
        ThemeCommands::Export { output } => {
            let json = themes_to_json(themes.list())?;
            emit_json(&json, output.as_ref())?;
        }
    }

    Ok(())
}

// ============================================================================
// Palettes
// ============================================================================

/// Run a `palette` subcommand
pub fn run_palette_command(command: &PaletteCommands, config: &Config) -> Result<()> {
    let store = open_store(config);
    let palettes = PaletteStore::new(store.clone());

    match command {
        PaletteCommands::Save { name, colors, url } => {
            let colors = colors
                .iter()
                .map(|c| parse_color(c))
                .collect::<Result<Vec<_>>>()?;
            let palette = palettes.save(name, colors, url.clone(), None, Vec::new())?;
            info!("Palette \"{}\" saved (id {})", palette.name, palette.id);
        }
        PaletteCommands::Snap { image, name, k } => {
            let k = k.unwrap_or(config.palette.default_colors);
            let history = ColorHistory::load(store.clone())?;
            let palette = snap_image(image, name, k, palettes, history, config)?;
            println!("{}", palette.join(" "));
        }
        PaletteCommands::List => {
            let list = palettes.list()?;
            if list.is_empty() {
                println!("No saved palettes yet");
            }
            for palette in list {
                println!("{:>14}  {:<24} {}", palette.id, palette.name, palette.hexes().join(" "));
            }
        }
        PaletteCommands::Delete { id, yes } => {
            let palette = palettes.get(id)?;
            if !confirm(
                &format!("Are you sure you want to delete palette \"{}\"?", palette.name),
                *yes,
            )? {
                info!("Cancelled");
                return Ok(());
            }
            palettes.delete(id)?;
            info!("Palette deleted");
        }
        PaletteCommands::Share { id, base, copy } => {
            let palette = palettes.get(id)?;
            let payload = SharePayload::from_palette(&palette);
            let link = payload.to_link(base)?;
            println!("{}", payload.to_code()?);
            println!();
            println!("{}", link);

            if *copy {
                let mut clipboard = SystemClipboard::new();
                match clipboard.set_text(&link) {
                    Ok(()) => info!("Share link copied to clipboard"),
                    Err(e) => warn!("{}", e),
                }
            }
        }
        PaletteCommands::Export { output } => {
            let json = palettes_to_json(&palettes.list()?)?;
            emit_json(&json, output.as_ref())?;
        }
        PaletteCommands::History { clear } => {
            let mut history = ColorHistory::load(store.clone())?;
            if *clear {
                history.clear()?;
                info!("Color history cleared");
            } else if history.is_empty() {
                println!("No colors picked yet");
            } else {
                let now = chrono::Utc::now();
                for entry in history.entries() {
                    println!("{}  {}", entry.color, entry.age_label(now));
                }
            }
        }
    }

    Ok(())
}

/// Snap a whole image through the background service and save the result
fn snap_image(
    path: &Path,
    name: &str,
    k: usize,
    palettes: PaletteStore,
    history: ColorHistory,
    config: &Config,
) -> Result<Vec<String>> {
    let image = image::open(path)
        .with_context(|| format!("Failed to load image {}", path.display()))?
        .to_rgb8();
    let (width, height) = image.dimensions();
    let pixels: Vec<(u8, u8, u8)> = image.pixels().map(|p| (p.0[0], p.0[1], p.0[2])).collect();
    let page = PageDump::new().with_pixels(width, height, pixels);

    let service = BackgroundService::new(Arc::new(page), Box::new(SystemClipboard::new()), palettes)
        .with_snap_colors(k)
        .with_history(history);
    let handle = service.spawn();
    let client = handle.client();
    let timeout = config.messaging.timeout();

    let colors = match client.request_with(
        Action::SnapArea {
            rect: Rect::new(0, 0, width, height),
        },
        timeout,
    )? {
        Response::Colors(colors) => colors,
        Response::Error(e) => bail!(e),
        other => bail!("Unexpected response: {:?}", other),
    };

    let name = match name.trim() {
        "" => path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
        trimmed => trimmed.to_string(),
    };

    match client.request_with(
        Action::SavePalette {
            name,
            colors: colors.clone(),
            url: None,
        },
        timeout,
    )? {
        Response::Palette(palette) => {
            info!("Palette \"{}\" saved (id {})", palette.name, palette.id)
        }
        Response::Error(e) => bail!(e),
        other => bail!("Unexpected response: {:?}", other),
    }

    handle.shutdown();
    Ok(colors)
}

// ============================================================================
// Configuration
// ============================================================================

/// Print the active config path
pub fn show_config_path() {
    let path = Config::get_active_config_path();
    println!("{}", path.display());
    if path.exists() {
        info!("Config file exists at: {}", path.display());
    } else {
        info!("Config file would be created at: {}", path.display());
    }
}

/// Generate a configuration file at the specified or default location
pub fn generate_config_file(output: Option<PathBuf>) -> Result<()> {
    let output_path = match output {
        Some(path) => {
            fs::write(&path, Config::generate_default_config())?;
            path
        }
        None => init_config()?,
    };

    info!("Configuration file: {}", output_path.display());
    info!("Edit this file to customize storage, palette and audit settings.");
    Ok(())
}

/// Show the current configuration settings
pub fn show_config(config: &Config) {
    let config_path = Config::get_active_config_path();
    info!("Configuration file: {}", config_path.display());
    if !config_path.exists() {
        info!("(Using default settings - no config file found)");
        if let Some(standard) = get_config_path() {
            info!("Run 'theme-picker config generate' to create {}", standard.display());
        }
    }

    match toml::to_string_pretty(config) {
        Ok(content) => println!("{}", content),
        Err(e) => warn!("Failed to render configuration: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.storage.path = dir.path().join("storage.json");
        config
    }

    fn run(config: &Config, argv: &[&str]) -> Result<()> {
        let mut full = vec!["theme-picker"];
        full.extend_from_slice(argv);
        run_command(&Args::parse_from(full), config)
    }

    const PAGE: &str = r##"{
        "elements": [
            {"tag": "body", "style": {"background-color": "#ffffff", "color": "#212529",
             "font-family": "Inter, sans-serif", "font-size": "16px",
             "font-weight": "400", "font-style": "normal"}},
            {"tag": "h1", "style": {"color": "navy", "font-family": "Georgia",
             "font-size": "32px", "font-weight": "bold", "font-style": "normal"}}
        ]
    }"##;

    #[test]
    fn test_theme_lifecycle() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);

        run(&config, &["theme", "save", "Ocean", "--colors", "#001f3f,#0074D9"]).unwrap();
        assert!(run(&config, &["theme", "save", "ocean", "--colors", "#000"]).is_err());
        assert!(run(&config, &["theme", "save", "Empty"]).is_err());

        let themes = ThemeStore::load(open_store(&config)).unwrap();
        assert_eq!(themes.len(), 1);
        let theme = &themes.list()[0];
        assert_eq!(theme.colors[1].hex, "#0074d9");

        let id = theme.id.to_string();
        run(&config, &["theme", "delete", &id, "--yes"]).unwrap();
        assert!(ThemeStore::load(open_store(&config)).unwrap().is_empty());
    }

    #[test]
    fn test_theme_save_from_page_and_apply() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        let page = dir.path().join("page.json");
        fs::write(&page, PAGE).unwrap();
        let page = page.to_string_lossy().into_owned();

        run(&config, &["theme", "save", "Landing", "--page", &page]).unwrap();
        let themes = ThemeStore::load(open_store(&config)).unwrap();
        let theme = &themes.list()[0];
        assert_eq!(theme.colors.len(), 3);
        assert_eq!(theme.fonts.len(), 2);

        let id = theme.id.to_string();
        run(&config, &["theme", "apply", &id, &page]).unwrap();
        assert!(run(&config, &["theme", "apply", "42", &page]).is_err());
    }

    #[test]
    fn test_theme_export_to_file() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        run(&config, &["theme", "save", "Ocean", "--colors", "#001f3f"]).unwrap();

        let out = dir.path().join("themes.json");
        run(&config, &["theme", "export", "-o", &out.to_string_lossy()]).unwrap();
        let exported: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(exported[0]["name"], "Ocean");
    }

    #[test]
    fn test_palette_save_and_delete() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        run(&config, &["palette", "save", "Brand", "#FF0000", "rgb(0, 0, 255)"]).unwrap();
        assert!(run(&config, &["palette", "save", "Bad", "notacolor"]).is_err());

        let palettes = PaletteStore::new(open_store(&config));
        let list = palettes.list().unwrap();
        assert_eq!(list[0].hexes(), vec!["#ff0000", "#0000ff"]);

        run(&config, &["palette", "share", &list[0].id]).unwrap();
        run(&config, &["palette", "delete", &list[0].id, "--yes"]).unwrap();
        assert!(palettes.list().unwrap().is_empty());
    }

    #[test]
    fn test_palette_snap_through_service() {
        use crate::testdb::PixelGenerator;

        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        let image = dir.path().join("snap.png");
        let pixels: Vec<(u8, u8, u8)> = (0..16)
            .map(|i| if i % 2 == 0 { (255, 0, 0) } else { (0, 0, 255) })
            .collect();
        PixelGenerator::write_png(&image, 4, &pixels).unwrap();

        run(&config, &["palette", "snap", &image.to_string_lossy(), "-k", "2"]).unwrap();
        let list = PaletteStore::new(open_store(&config)).list().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].name, "snap");
        assert_eq!(list[0].hexes(), vec!["#ff0000", "#0000ff"]);

        let history = ColorHistory::load(open_store(&config)).unwrap();
        let snapped: Vec<&str> = history.entries().iter().map(|e| e.color.as_str()).collect();
        assert_eq!(snapped, vec!["#ff0000", "#0000ff"]);

        run(&config, &["palette", "history"]).unwrap();
        run(&config, &["palette", "history", "--clear"]).unwrap();
        assert!(ColorHistory::load(open_store(&config)).unwrap().is_empty());
    }

    #[test]
    fn test_color_tools() {
        let config = Config::default();
        run(&config, &["convert", "rebeccapurple"]).unwrap();
        assert!(run(&config, &["convert", "nope"]).is_err());
        run(&config, &["contrast", "#000", "#fff"]).unwrap();
        run(&config, &["generate", "#3366cc", "--scheme", "split-complementary"]).unwrap();
        run(&config, &["audit", "#ffffff", "#000000", "nope"]).unwrap();
        run(&config, &["simulate", "#ff0000"]).unwrap();
    }

    #[test]
    fn test_load_page_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(load_page(&path).is_err());
        assert!(load_page(&dir.path().join("missing.json")).is_err());
    }
}
