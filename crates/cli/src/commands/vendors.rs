//! Vendor directory commands.
//!
//! The interactive search runs the same debounced controller the dashboard
//! logic is built on: each input line is a query edit, and the listing is
//! redrawn whenever a fetch lands.

use std::io::{self, Write};

use elate_chem_core::{SearchMode, SequenceNumber, VendorRecord};
use elate_chem_site::controllers::{
    Notice, SearchController, SearchState, SearchStatus, VendorEditor,
};
use elate_chem_site::services::VendorService;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{CliError, DetailArgs};

const fn mode(admin: bool) -> SearchMode {
    if admin {
        SearchMode::AdminListing
    } else {
        SearchMode::Public
    }
}

// =============================================================================
// Rendering
// =============================================================================

/// Write a listing page as aligned columns.
///
/// # Errors
///
/// Returns any error from the writer.
pub fn render_rows(out: &mut impl Write, rows: &[VendorRecord]) -> io::Result<()> {
    writeln!(
        out,
        "{:>6}  {:<28} {:<14} {:<24} {:<16}",
        "Sr.No", "Chemical", "CAS No.", "Supplier", "Country"
    )?;
    for row in rows {
        let d = &row.details;
        writeln!(
            out,
            "{:>6}  {:<28} {:<14} {:<24} {:<16}",
            row.sequence_number, d.chemical_name, d.cas_number, d.supplier_name, d.country
        )?;
    }
    Ok(())
}

/// Write a listing snapshot: rows, pager line, or the status when not ready.
///
/// # Errors
///
/// Returns any error from the writer.
pub fn render_state(out: &mut impl Write, state: &SearchState) -> io::Result<()> {
    match state.status {
        SearchStatus::Idle => writeln!(out, "Type a chemical name or CAS number to search."),
        SearchStatus::Loading => Ok(()),
        SearchStatus::Failed => writeln!(out, "Search failed. Edit the query or :r to retry."),
        SearchStatus::Ready if state.results.is_empty() => {
            writeln!(out, "No vendors match \"{}\".", state.query.trim())
        }
        SearchStatus::Ready => {
            render_rows(out, &state.results)?;
            writeln!(
                out,
                "Page {} of {} ({} vendors)",
                state.window.page(),
                state.window.total_pages(),
                state.window.total_count()
            )
        }
    }
}

fn render_notice(out: &mut impl Write, notice: Option<&Notice>) -> io::Result<()> {
    match notice {
        Some(notice) if notice.is_error() => writeln!(out, "error: {}", notice.text()),
        Some(notice) => writeln!(out, "{}", notice.text()),
        None => Ok(()),
    }
}

fn render_record(out: &mut impl Write, record: &VendorRecord) -> io::Result<()> {
    let d = &record.details;
    writeln!(out, "Sr. No:          {}", record.sequence_number)?;
    writeln!(out, "Chemical Name:   {}", d.chemical_name)?;
    writeln!(out, "Category:        {}", d.category)?;
    writeln!(out, "CAS Number:      {}", d.cas_number)?;
    writeln!(out, "Supplier Name:   {}", d.supplier_name)?;
    writeln!(out, "Email / Link:    {}", d.contact_info)?;
    writeln!(out, "Phone Number:    {}", d.phone_number)?;
    writeln!(out, "Business Status: {}", d.business_status)?;
    writeln!(out, "Country:         {}", d.country)
}

// =============================================================================
// Search
// =============================================================================

/// Fetch and print one page.
///
/// # Errors
///
/// Returns `CliError::Vendor` if the store request fails.
pub async fn search_once(
    service: &VendorService,
    admin: bool,
    query: &str,
    page: u64,
) -> Result<(), CliError> {
    let page = service.search(mode(admin), query, page).await?;
    let state = SearchState {
        query: page.query,
        window: page.window,
        results: page.results,
        status: if page.fetched {
            SearchStatus::Ready
        } else {
            SearchStatus::Idle
        },
    };
    render_state(&mut io::stdout().lock(), &state)?;
    Ok(())
}

/// An interactive-mode input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Query(String),
    Next,
    Previous,
    Page(u64),
    Refresh,
    Edit(SequenceNumber, Vec<(String, String)>),
    Delete(SequenceNumber),
    Quit,
    Help,
    Unknown(String),
}

impl Input {
    /// Parse one line. Lines starting with `:` are commands, anything else is
    /// the new query.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let Some(command) = line.trim().strip_prefix(':') else {
            return Self::Query(line.to_owned());
        };

        let mut words = command.split_whitespace();
        match (words.next(), words.next()) {
            (Some("q" | "quit"), None) => Self::Quit,
            (Some("n" | "next"), None) => Self::Next,
            (Some("p" | "prev"), None) => Self::Previous,
            (Some("r" | "refresh"), None) => Self::Refresh,
            (Some("h" | "help"), None) => Self::Help,
            (Some("page"), Some(n)) => n
                .parse()
                .map_or_else(|_| Self::Unknown(line.to_owned()), Self::Page),
            (Some("delete"), Some(n)) => SequenceNumber::parse(n)
                .map_or_else(|_| Self::Unknown(line.to_owned()), Self::Delete),
            (Some("edit"), Some(n)) => {
                let Ok(srno) = SequenceNumber::parse(n) else {
                    return Self::Unknown(line.to_owned());
                };
                let changes = words
                    .filter_map(|pair| pair.split_once('='))
                    .map(|(k, v)| (k.to_owned(), v.replace('_', " ")))
                    .collect();
                Self::Edit(srno, changes)
            }
            _ => Self::Unknown(line.to_owned()),
        }
    }
}

const HELP: &str = "\
Type to search. Commands:
  :n / :p            next / previous page
  :page N            jump to page N
  :r                 refetch the current page
  :edit N field=value ...   change fields of a listed vendor (use _ for spaces)
  :delete N          delete a listed vendor (asks first)
  :q                 quit";

fn field_by_name(name: &str) -> Option<elate_chem_core::VendorField> {
    use elate_chem_core::VendorField;
    match name {
        "chemical_name" => Some(VendorField::ChemicalName),
        "category" => Some(VendorField::Category),
        "cas_number" => Some(VendorField::CasNumber),
        "supplier_name" => Some(VendorField::SupplierName),
        "contact_info" => Some(VendorField::ContactInfo),
        "phone_number" => Some(VendorField::PhoneNumber),
        "business_status" => Some(VendorField::BusinessStatus),
        "country" => Some(VendorField::Country),
        _ => None,
    }
}

/// Run the interactive listing until `:q` or end of input.
///
/// # Errors
///
/// Returns `CliError::Io` if stdin or stdout fails.
pub async fn search_interactive(service: VendorService, admin: bool) -> Result<(), CliError> {
    let controller = SearchController::new(service.clone(), mode(admin));
    let mut editor = VendorEditor::new(service, Some(controller.listing()));

    // Redraw on every published state; Loading frames draw nothing.
    let mut updates = controller.subscribe();
    let renderer = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let state = updates.borrow_and_update().clone();
            if render_state(&mut io::stdout().lock(), &state).is_err() {
                break;
            }
        }
    });

    if admin {
        controller.refresh();
    }
    writeln!(io::stdout().lock(), "{HELP}")?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match Input::parse(&line) {
            Input::Query(query) => controller.set_query(query),
            Input::Next => controller.next_page(),
            Input::Previous => controller.previous_page(),
            Input::Page(page) => controller.set_page(page),
            Input::Refresh => controller.refresh(),
            Input::Help => writeln!(io::stdout().lock(), "{HELP}")?,
            Input::Quit => break,
            Input::Unknown(line) => {
                writeln!(io::stdout().lock(), "Unknown command: {line} (:h for help)")?;
            }
            Input::Edit(srno, changes) => {
                edit_listed(&mut io::stdout(), &mut editor, srno, &changes).await?;
            }
            Input::Delete(srno) => {
                if controller.listing().find(srno).is_none() {
                    writeln!(io::stdout().lock(), "Vendor {srno} is not on this page.")?;
                    continue;
                }
                let pending = editor.request_delete(srno);
                write!(io::stdout().lock(), "Delete vendor {srno}? [y/N] ")?;
                io::stdout().flush()?;
                let answer = lines.next_line().await?.unwrap_or_default();
                if answer.trim().eq_ignore_ascii_case("y") {
                    // The listing redraws itself when the row is dropped.
                    if let Err(e) = editor.confirm_delete(pending).await {
                        tracing::debug!(error = %e, srno = %srno, "Delete failed");
                    }
                    render_notice(&mut io::stdout().lock(), editor.notice())?;
                }
            }
        }
    }

    renderer.abort();
    Ok(())
}

async fn edit_listed(
    out: &mut impl Write,
    editor: &mut VendorEditor,
    srno: SequenceNumber,
    changes: &[(String, String)],
) -> Result<(), CliError> {
    if !editor.begin_edit_from_listing(srno) {
        writeln!(out, "Vendor {srno} is not on this page.")?;
        return Ok(());
    }

    for (name, value) in changes {
        match field_by_name(name) {
            Some(field) => {
                editor.edit_field(field, value.as_str());
            }
            None => writeln!(out, "Unknown field: {name}")?,
        }
    }

    if let Some(Err(e)) = editor.submit_edit().await {
        tracing::debug!(error = %e, srno = %srno, "Edit failed");
    }
    let notice = editor.editing().and_then(|s| s.notice().cloned());
    render_notice(out, notice.as_ref())?;
    Ok(())
}

// =============================================================================
// Mutations
// =============================================================================

/// Print the next sequence number.
///
/// # Errors
///
/// Returns `CliError::Vendor` if the scan fails.
pub async fn next_srno(service: &VendorService) -> Result<(), CliError> {
    let next = service.next_sequence_number().await?;
    writeln!(io::stdout().lock(), "{next}")?;
    Ok(())
}

/// Add a vendor under the next sequence number.
///
/// # Errors
///
/// Returns `CliError::Vendor` for blank fields or a failed insert.
pub async fn add(service: VendorService, details: &DetailArgs) -> Result<(), CliError> {
    let mut editor = VendorEditor::new(service, None);
    editor.refresh_next_sequence().await;
    for (field, value) in details.fields() {
        editor.set_field(field, value);
    }

    let result = editor.submit_new().await;
    let mut out = io::stdout().lock();
    render_notice(&mut out, editor.notice())?;
    let record = result?;
    render_record(&mut out, &record)?;
    Ok(())
}

/// Change the given fields of an existing vendor.
///
/// # Errors
///
/// Returns `CliError::Vendor` if the vendor is unknown or the update fails.
pub async fn update(service: VendorService, srno: &str, details: &DetailArgs) -> Result<(), CliError> {
    let sequence_number = SequenceNumber::parse(srno)?;
    let mut editor = VendorEditor::new(service.clone(), None);

    let mut record = service.get(sequence_number).await?;
    details.apply(&mut record.details);
    editor.begin_edit(record);

    let Some(result) = editor.submit_edit().await else {
        return Ok(());
    };
    let notice = editor.editing().and_then(|s| s.notice().cloned());
    let mut out = io::stdout().lock();
    render_notice(&mut out, notice.as_ref())?;
    render_record(&mut out, &result?)?;
    Ok(())
}

/// Delete a vendor after confirmation.
///
/// # Errors
///
/// Returns `CliError::Cancelled` if the prompt is declined, or
/// `CliError::Vendor` if the delete fails.
pub async fn delete(service: VendorService, srno: &str, yes: bool) -> Result<(), CliError> {
    let sequence_number = SequenceNumber::parse(srno)?;
    let mut editor = VendorEditor::new(service, None);
    let pending = editor.request_delete(sequence_number);

    if !yes {
        write!(io::stdout().lock(), "Delete vendor {sequence_number}? [y/N] ")?;
        io::stdout().flush()?;
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let answer = lines.next_line().await?.unwrap_or_default();
        if !answer.trim().eq_ignore_ascii_case("y") {
            return Err(CliError::Cancelled);
        }
    }

    let result = editor.confirm_delete(pending).await;
    render_notice(&mut io::stdout().lock(), editor.notice())?;
    result?;
    Ok(())
}
