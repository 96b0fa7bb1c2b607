//! Human-readable detail view for certificate summaries.
//!
//! Layout follows `openssl x509 -text` for the fields a summary carries.

use time::format_description::FormatItem;
use time::macros::format_description;
use time::OffsetDateTime;

use super::CertificateSummary;

pub(super) fn hex_colon(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(":")
}

const TEXT_TIME_FORMAT: &[FormatItem] = format_description!(
    "[month repr:short] [day padding:space] [hour]:[minute]:[second] [year] UTC"
);

/// `openssl`-style timestamp, falling back to the `Display` form if the
/// value cannot be formatted.
fn format_time(t: OffsetDateTime) -> String {
    t.format(TEXT_TIME_FORMAT).unwrap_or_else(|_| t.to_string())
}

impl CertificateSummary {
    /// Produce a multi-line detail view.
    ///
    /// Fields missing from older stored records are left out.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str("Certificate:\n");
        if self.version > 0 {
            out.push_str(&format!(
                "    Version: {} (0x{:x})\n",
                self.version,
                self.version - 1
            ));
        }
        if !self.serial_number.is_empty() {
            out.push_str(&format!("    Serial Number: {}\n", self.serial_number));
        }
        if !self.issuer.is_empty() {
            out.push_str(&format!("    Issuer: {}\n", self.issuer));
        }
        out.push_str("    Validity\n");
        out.push_str(&format!(
            "        Not Before: {}\n",
            format_time(self.not_before)
        ));
        out.push_str(&format!(
            "        Not After : {}\n",
            format_time(self.not_after)
        ));
        if !self.subject.is_empty() {
            out.push_str(&format!("    Subject: {}\n", self.subject));
        }
        out.push_str(&format!(
            "    Subject Common Name: {}\n",
            self.subject_common_name
        ));
        out.push_str(&format!(
            "    Issuer Common Name: {}\n",
            self.issuer_common_name
        ));
        out
    }
}
