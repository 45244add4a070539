const UNITS: &[&str] = &["Bytes", "KB", "MB", "GB", "TB"];

/// Formats a byte count with binary (1024) steps, e.g. `"3.41 MB"`.
///
/// | Input         | Output         |
/// |---------------|----------------|
/// | 0             | `0.00 Bytes`   |
/// | 1536          | `1.50 KB`      |
/// | 1073741824    | `1.00 GB`      |
///
/// Values past the last unit stay in TB.
pub fn format_byte_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    let mut unit = 0;

    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    format!("{:.2} {}", size, UNITS[unit])
}
