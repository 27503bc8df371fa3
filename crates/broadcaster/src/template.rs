use flood_core::RiskLevel;

/// Render the text every channel sends.
///
/// ```
/// use flood_core::RiskLevel;
///
/// let text = broadcaster::render_alert(RiskLevel::High, "Move to higher ground", "FloodWatch");
/// assert_eq!(text, "⚠️ Flood Alert (HIGH):\nMove to higher ground\n- FloodWatch");
/// ```
pub fn render_alert(level: RiskLevel, message: &str, signature: &str) -> String {
    format!(
        "⚠️ Flood Alert ({}):\n{}\n- {}",
        level.as_str().to_uppercase(),
        message.trim(),
        signature
    )
}
