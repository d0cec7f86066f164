// LogWarden - core/prompt.rs
//
// Detector prompt construction. Pure string building; the detector owns
// transport.

use crate::core::model::LogBatch;

/// Instruction block placed ahead of the log excerpt.
const INSTRUCTIONS: &str = "\
### Instructions ###
Review the following Apache access log for anomalies from a security point of view.
For every suspicious line, in ascending date order, answer these four points:
1. Source IP address
2. Date (YYYY/MM/DD HH:MM:SS)
3. Issue (summary, plus the offending excerpt from the log)
4. Remediation
";

/// Build the full prompt for one batch.
pub fn build_prompt(batch: &LogBatch) -> String {
    let body = batch.joined();
    let mut prompt = String::with_capacity(INSTRUCTIONS.len() + body.len() + 32);
    prompt.push_str(INSTRUCTIONS);
    prompt.push_str("\n### Apache log ###\n");
    prompt.push_str(&body);
    prompt.push('\n');
    prompt
}
