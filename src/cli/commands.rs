use std::sync::Arc;

use crate::cli::config::TagArgs;
use crate::console::session::{ConsoleSession, SessionConfig};
use crate::form::controller::FormController;
use crate::form::draft::FormDraft;
use crate::registry::registry_model::ActionCatalog;
use crate::registry::view::RegistryView;
use crate::render::console::{format_options, format_registry, fragment_to_text, sanitize};
use crate::render::fragment::{RenderContext, TemplateKey};
use crate::render::html::generate_registry_page;
use crate::render::renderer::{DefaultRenderer, Renderer};
use crate::transport::transport::{SubmitKind, Transport};

// ============================================================================
// watch subcommand
// ============================================================================

pub fn cmd_watch(
    transport: Arc<dyn Transport>,
    config: SessionConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    if config.verbose > 0 {
        eprintln!("Starting console (poll interval {:?})...", config.poll_interval);
    }

    let mut session = ConsoleSession::new(transport, config);
    session.run()
}

// ============================================================================
// registry subcommand
// ============================================================================

pub fn cmd_registry(
    transport: &dyn Transport,
    format: &str,
    output: Option<&str>,
    verbose: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    let renderer = DefaultRenderer;
    let mut view = RegistryView::new();
    view.refresh(transport, &renderer)?;

    if verbose > 0 {
        eprintln!(
            "Loaded {} tags, {} actions",
            view.entries().len(),
            view.catalog().len()
        );
    }

    let content = match format {
        "html" => generate_registry_page(view.rows(), &view.options(&renderer, None), None),
        _ => format_registry(view.rows()),
    };

    match output {
        Some(path) => {
            std::fs::write(path, &content)?;
            eprintln!("Registry written to {}", path);
        }
        None => print!("{}", content),
    }

    Ok(())
}

// ============================================================================
// actions / latest subcommands
// ============================================================================

pub fn cmd_actions(transport: &dyn Transport) -> Result<(), Box<dyn std::error::Error>> {
    let mut view = RegistryView::new();
    view.refresh_catalog(transport)?;
    print!("{}", format_options(&view.options(&DefaultRenderer, None)));
    Ok(())
}

pub fn cmd_latest(transport: &dyn Transport) -> Result<(), Box<dyn std::error::Error>> {
    let record = transport.fetch_latest()?;

    if !record.success {
        let message = record.message.as_deref().unwrap_or("No tag scanned yet");
        println!("{}", sanitize(message));
        return Ok(());
    }

    let notice = DefaultRenderer.render(TemplateKey::ScanNotice, &RenderContext::scan_notice(&record));
    println!("{}", fragment_to_text(&notice));
    if let Some(scanned) = &record.scanned {
        println!("  scanned: {}", scanned);
    }
    Ok(())
}

// ============================================================================
// register / unregister subcommands
// ============================================================================

pub fn draft_from_args(args: &TagArgs) -> FormDraft {
    FormDraft {
        uid: args.uid.clone(),
        alias: args.alias.clone(),
        parameter: args.parameter.clone(),
        action: args.action.clone().filter(|a| !a.is_empty()),
    }
}

/// Submit one tag and print the registry afterwards. Returns whether the
/// backend accepted it.
pub fn cmd_submit(
    transport: &dyn Transport,
    kind: SubmitKind,
    args: &TagArgs,
    verbose: u8,
) -> Result<bool, Box<dyn std::error::Error>> {
    let renderer = DefaultRenderer;
    let mut form = FormController::new();
    form.load_draft(draft_from_args(args));

    if verbose > 0 {
        eprintln!("Sending {} for uid {}", kind, sanitize(&args.uid));
    }

    // Without --action the backend gets the first catalog entry, same as the
    // selector in the watch console.
    let catalog = if args.action.as_deref().is_none_or(str::is_empty) {
        transport.fetch_catalog().unwrap_or_else(|e| {
            eprintln!("Warning: could not load action classes: {}", e);
            ActionCatalog::default()
        })
    } else {
        ActionCatalog::default()
    };

    match form.submit_selected(transport, kind, &catalog) {
        Ok(outcome) => {
            println!(
                "{}: {}",
                kind,
                sanitize(outcome.message.as_deref().unwrap_or("Request successful"))
            );
            let mut view = RegistryView::new();
            view.refresh_registry(transport, &renderer)?;
            print!("{}", format_registry(view.rows()));
            Ok(true)
        }
        Err(e) => {
            let fragment = renderer.render(
                TemplateKey::ErrorMessage,
                &RenderContext::error_message(form.error().unwrap_or(&e.to_string())),
            );
            eprintln!("{}", fragment_to_text(&fragment));
            Ok(false)
        }
    }
}
