pub fn sleep_label(value: u8) -> &'static str {
    match value {
        5 => "Excellent",
        4 => "Good",
        3 => "Okay",
        2 => "Poor",
        1 => "Terrible",
        _ => "Unknown",
    }
}

pub fn productivity_label(value: u8) -> &'static str {
    match value {
        5 => "Very productive",
        4 => "Productive",
        3 => "Moderately productive",
        2 => "Slightly productive",
        1 => "Not productive",
        _ => "Unknown",
    }
}
