/// Formats a duration in seconds as a clock string.
///
/// Durations under an hour are formatted as `MM:SS`, longer ones as `H:MM:SS`.
/// Negative and non-finite values (e.g. before the media metadata has loaded) format as `00:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return String::from("00:00");
    }

    let total = seconds.floor() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}
