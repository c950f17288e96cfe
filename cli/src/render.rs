//! Plain-terminal rendering of the add-item form.

use listing_client::AddItemPage;
use listing_client::LOGIN_REQUIRED_MESSAGE;
use listing_client::MAX_ATTACHMENTS;
use listing_client::PreviewStore;
use listing_protocol::ListingField;
use listing_protocol::catalog;

pub fn render_form<S: PreviewStore>(page: &AddItemPage<S>) -> String {
    let mut out = String::new();
    out.push_str(&ansi_bold("Add New Item"));
    out.push('\n');

    for field in ListingField::ALL {
        let value = page.gate().field(field);
        let shown = if value.is_empty() {
            ansi_dim(catalog::placeholder(field).unwrap_or(""))
        } else if catalog::choices(field).is_some() {
            catalog::choice_label(value)
        } else {
            value.to_string()
        };
        out.push_str(&format!("{:<15} {shown}\n", field.label()));
        if let Some(choices) = catalog::choices(field) {
            let labels: Vec<String> = choices.iter().copied().map(catalog::choice_label).collect();
            out.push_str(&format!("{:<15} {}\n", "", ansi_dim(&labels.join(" | "))));
        }
    }

    out.push_str(&format!("\nImages (up to {MAX_ATTACHMENTS}):\n"));
    for (position, (attachment, preview)) in page.attachments().iter().enumerate() {
        out.push_str(&format!(
            "  {}. {}  {}\n",
            position + 1,
            attachment.file_name(),
            ansi_dim(preview.uri())
        ));
    }
    let remaining = page.attachments().remaining_capacity();
    if page.attachments().can_add_more() {
        out.push_str(&format!("  + Add Image ({remaining} left)\n"));
    }

    if let Some(message) = page.message() {
        out.push('\n');
        out.push_str(&render_error(message));
        out.push('\n');
    }

    out.push_str(&format!("\n[ {} ]\n", page.gate().status().button_label()));
    out
}

pub fn render_login_required() -> String {
    format!("{}\n", ansi_red(LOGIN_REQUIRED_MESSAGE))
}

pub fn render_error(message: &str) -> String {
    ansi_red(message)
}

fn ansi_red(text: &str) -> String {
    format!("\u{1b}[31m{text}\u{1b}[0m")
}

fn ansi_bold(text: &str) -> String {
    format!("\u{1b}[1m{text}\u{1b}[22m")
}

fn ansi_dim(text: &str) -> String {
    format!("\u{1b}[2m{text}\u{1b}[22m")
}
