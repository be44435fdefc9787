use std::env;

/// Build-time defaults for the settings record
///
/// Used when the settings partition is empty or invalid. Empty if unset.
const DEFAULTS: &[(&str, bool)] = &[
    // (variable, secret)
    ("TRACKER_APN", false),
    ("TRACKER_APN_USER", false),
    ("TRACKER_APN_PASSWORD", true),
    ("TRACKER_SERVER_KEY", true),
    ("TRACKER_SMS_KEY", true),
];

fn main() {
    for &(name, secret) in DEFAULTS {
        match env::var(name) {
            Ok(value) => {
                println!("cargo:rustc-env={}={}", name, value);
                if secret {
                    println!("cargo:warning=Using {} from environment (hidden)", name);
                } else {
                    println!("cargo:warning=Using {} from environment: {}", name, value);
                }
            }
            Err(_) => println!("cargo:rustc-env={}=", name),
        }

        // Rerun if environment variables change
        println!("cargo:rerun-if-env-changed={}", name);
    }
}
