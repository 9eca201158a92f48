use colored::Colorize;

/// Format a base-unit amount with thousands separators, colored for console output
pub fn format_amount(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out.yellow().to_string()
}

/// Format an address truncated for display
pub fn format_address(address: &str) -> String {
    if address.len() <= 12 {
        address.to_string()
    } else {
        format!("{}...{}", &address[..6], &address[address.len() - 6..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_address_truncates() {
        assert_eq!(format_address("0xshort"), "0xshort");
        assert_eq!(
            format_address("0xab5801a7d398351b8be11c439e05c5b3259aec9b"),
            "0xab58...9aec9b"
        );
    }
}
