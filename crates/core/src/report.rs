//! HTML report formatting for the notification channel.

use chrono::Utc;

use crate::position::PositionSnapshot;

/// Compact USD formatting: $1.23M, $45.60K, $789.00.
pub fn compact_usd(num: f64) -> String {
    if num >= 1_000_000.0 {
        format!("${:.2}M", num / 1_000_000.0)
    } else if num >= 1_000.0 {
        format!("${:.2}K", num / 1_000.0)
    } else {
        format!("${:.2}", num)
    }
}

fn network_emoji(network: &str) -> &'static str {
    match network {
        "ethereum" => "\u{1F537}", // 🔷
        "polygon" => "\u{1F7E3}",  // 🟣
        "arbitrum" => "\u{1F535}", // 🔵
        "optimism" => "\u{1F534}", // 🔴
        _ => "\u{1F4CA}",          // 📊
    }
}

fn health_emoji(health_factor: f64) -> &'static str {
    if health_factor < 1.1 {
        "\u{1F534}" // 🔴
    } else if health_factor < 1.5 {
        "\u{1F7E1}" // 🟡
    } else {
        "\u{1F7E2}" // 🟢
    }
}

const SEPARATOR: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";

/// Format the cycle's aggregate into a Telegram HTML message.
pub fn format_report(network: &str, positions: &[PositionSnapshot]) -> String {
    let mut message = format!(
        "{} <b>AAVE Monitor - {}</b>\n",
        network_emoji(network),
        network.to_uppercase()
    );
    message.push_str(&format!(
        "\u{1F550} <i>{}</i>\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));
    message.push_str(SEPARATOR);
    message.push_str("\n\n");

    for (i, position) in positions.iter().enumerate() {
        message.push_str("<b>\u{1F4CD} Address:</b>\n");
        message.push_str(&format!("<code>{}</code>\n\n", position.address));

        message.push_str("<b>\u{1F517} Links:</b>\n");
        message.push_str(&format!(
            "\u{2022} <a href='https://debank.com/profile/{}'>DeBank</a>\n",
            position.address
        ));
        message.push_str(&format!(
            "\u{2022} <a href='https://defisim.xyz/?address={}'>DeFiSim</a>\n\n",
            position.address
        ));

        message.push_str(&format!(
            "<b>\u{1F4B0} Collateral:</b> {}\n",
            compact_usd(position.collateral_usd)
        ));
        message.push_str(&format!(
            "<b>\u{1F4C9} Debt:</b> {}\n",
            compact_usd(position.debt_usd)
        ));
        message.push_str(&format!(
            "<b>{} Health Factor:</b> {:.4}\n",
            health_emoji(position.health_factor),
            position.health_factor
        ));

        if let Some(risk) = &position.risk {
            if risk.price_drop_to_liquidation_pct > 0.0 {
                message.push_str(&format!(
                    "<b>\u{26A0} Liquidation Price:</b> -{:.2}% from current\n",
                    risk.price_drop_to_liquidation_pct
                ));
            } else {
                message.push_str("<b>\u{26A0} Liquidation Price:</b> Already below (HF < 1.0)\n");
            }
        }

        if i + 1 < positions.len() {
            message.push('\n');
            message.push_str(SEPARATOR);
            message.push_str("\n\n");
        }
    }

    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::Address;
    use monitor_chain::RawAccountData;

    use crate::position::PositionSnapshot;

    fn snapshot(hf_wad: u128) -> PositionSnapshot {
        use alloy::primitives::U256;
        let raw = RawAccountData {
            total_collateral_base: U256::from(1_000_000_000_000u64),
            total_debt_base: U256::from(500_000_000_000u64),
            available_borrows_base: U256::from(300_000_000_000u64),
            current_liquidation_threshold: U256::from(8_000u64),
            ltv: U256::from(7_500u64),
            health_factor: U256::from(hf_wad),
        };
        PositionSnapshot::from_raw(Address::ZERO, &raw, "https://rpc.test").unwrap()
    }

    #[test]
    fn test_compact_usd() {
        assert_eq!(compact_usd(1_234_567.0), "$1.23M");
        assert_eq!(compact_usd(45_600.0), "$45.60K");
        assert_eq!(compact_usd(789.0), "$789.00");
    }

    #[test]
    fn test_report_contains_position_metrics() {
        let text = format_report("ethereum", &[snapshot(1_600_000_000_000_000_000)]);
        assert!(text.contains("AAVE Monitor - ETHEREUM"));
        assert!(text.contains(&Address::ZERO.to_string()));
        assert!(text.contains("$10.00K"));
        assert!(text.contains("$5.00K"));
        assert!(text.contains("1.6000"));
        assert!(text.contains("-37.50% from current"));
    }

    #[test]
    fn test_underwater_position_message() {
        let text = format_report("ethereum", &[snapshot(900_000_000_000_000_000)]);
        assert!(text.contains("Already below (HF < 1.0)"));
    }

    #[test]
    fn test_separator_only_between_positions() {
        let one = format_report("polygon", &[snapshot(1_600_000_000_000_000_000)]);
        let two = format_report(
            "polygon",
            &[
                snapshot(1_600_000_000_000_000_000),
                snapshot(1_200_000_000_000_000_000),
            ],
        );
        assert_eq!(one.matches(SEPARATOR).count(), 1);
        assert_eq!(two.matches(SEPARATOR).count(), 2);
    }
}
