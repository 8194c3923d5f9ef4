//! Threshold tables mapping a daily parameter value to a category label.
//!
//! Every function is total: NaN falls through to the last branch.

/// Aerosol optical depth at 550nm.
pub fn categorize_aod(aod: f64) -> &'static str {
    if aod < 0.15 {
        "Clean"
    } else if (0.15..0.40).contains(&aod) {
        "Moderate"
    } else if (0.40..0.80).contains(&aod) {
        "Heavily Polluted"
    } else {
        "Extremely Polluted"
    }
}

/// Cloud amount in percent.
pub fn categorize_cloud(cloud_amount: f64) -> &'static str {
    if cloud_amount < 30.0 {
        "Sunny"
    } else if cloud_amount > 70.0 {
        "Cloudy"
    } else {
        "Partly Cloudy"
    }
}

/// Air temperature at 2m, in °C. Lower bounds are open, upper bounds closed.
pub fn categorize_temp(celsius: f64) -> &'static str {
    if celsius <= -10.0 {
        "Extremely Cold (<= -10°C)"
    } else if celsius <= 0.0 {
        "Very Cold (-10°C to 0°C)"
    } else if celsius <= 10.0 {
        "Cold (0°C to 10°C)"
    } else if celsius <= 20.0 {
        "Mild (10°C to 20°C)"
    } else if celsius <= 35.0 {
        "Warm (20°C to 35°C)"
    } else if celsius <= 45.0 {
        "Hot (35°C to 45°C)"
    } else {
        "Extremely Hot (> 45°C)"
    }
}

/// Snow depth.
pub fn categorize_snow(depth: f64) -> &'static str {
    if depth == 0.0 {
        "No Snow"
    } else if depth < 1.0 {
        "Light Snow"
    } else if depth < 5.0 {
        "Moderate Snow"
    } else {
        "Heavy Snow"
    }
}

/// Corrected total precipitation.
pub fn categorize_rainfall(precipitation: f64) -> &'static str {
    if precipitation == 0.0 {
        "No Rain"
    } else if precipitation < 5.0 {
        "Light Rain"
    } else if precipitation < 20.0 {
        "Moderate Rain"
    } else {
        "Heavy Rain"
    }
}

/// Wind speed at 10m.
pub fn categorize_wind(speed: f64) -> &'static str {
    if speed < 2.0 {
        "Calm"
    } else if speed < 5.0 {
        "Light Breeze"
    } else if speed < 10.0 {
        "Moderate Breeze"
    } else {
        "Strong Wind"
    }
}
