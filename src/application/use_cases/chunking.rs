use crate::domain::device::OutputFile;

/// Literal segment identifying the column layout of every output file
pub const FILE_LAYOUT_TAG: &str = "SN_IMEI1_IMEI2_EID";

/// Splits serialized lines into consecutive chunks of at most `max_lines`.
///
/// A new chunk starts exactly when the current one is full, so every chunk
/// but the last holds `max_lines` lines and no chunk is ever empty.
/// `max_lines` must be non-zero.
pub fn partition_lines(lines: &[String], max_lines: usize) -> Vec<&[String]> {
    debug_assert!(max_lines > 0, "max_lines must be > 0");
    lines.chunks(max_lines).collect()
}

/// `<model>_SN_IMEI1_IMEI2_EID_<date>_<index>.txt`, index starting at 1
pub fn output_file_name(model_name: &str, today_date: &str, index: usize) -> String {
    format!(
        "{}_{}_{}_{}.txt",
        model_name, FILE_LAYOUT_TAG, today_date, index
    )
}

/// Builds one newline-joined text file per chunk
pub fn build_output_files(
    lines: &[String],
    max_lines: usize,
    model_name: &str,
    today_date: &str,
) -> Vec<OutputFile> {
    partition_lines(lines, max_lines)
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| OutputFile {
            file_name: output_file_name(model_name, today_date, i + 1),
            content: chunk.join("\n"),
            line_count: chunk.len(),
        })
        .collect()
}
