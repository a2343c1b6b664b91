//! Console summary printed at the end of a run.

use std::fmt::Write;
use std::path::Path;

use crate::manifest::BuildMetadata;

/// Renders the human-readable run summary.
pub fn render_summary(metadata: &BuildMetadata, out_dir: &Path) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "\n🎉 Database build generation complete!");
    let _ = writeln!(out, "📊 Execution Summary:");
    let _ = writeln!(out, "   ✅ Successful: {}", metadata.successful_executions);
    let _ = writeln!(out, "   ❌ Failed: {}", metadata.failed_executions);
    let _ = writeln!(out, "   📁 Output directory: {}/", out_dir.display());

    if metadata.successful_executions > 0 {
        let _ = writeln!(out, "\n📄 Generated files:");
        for entry in metadata.successes() {
            let _ = writeln!(out, "   - {} ({} records)", entry.output, entry.records);
        }
    }

    if metadata.failed_executions > 0 {
        let _ = writeln!(out, "\n❌ Failed files:");
        for entry in metadata.failures() {
            let _ = writeln!(
                out,
                "   - {}: {}",
                entry.output,
                entry.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
    out
}
