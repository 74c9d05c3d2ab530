pub fn human_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }
    let mut n = bytes as f64;
    let units = ["B", "KB", "MB", "GB", "TB", "PB"];
    let mut u = 0;
    while n >= 1024.0 && u < units.len() - 1 {
        n /= 1024.0;
        u += 1;
    }
    format!("{:.1} {}", n, units[u])
}
