// src/banner.rs

/// Prints the application startup banner to the console.
pub fn print_banner() {
    let banner = r#"
  ___ ___  _   _ ___  ___ ___ __  __ ___ _ __   __
 / __/ _ \| | | | _ \/ __| __|  \/  | __| |\ \ / /
| (_| (_) | |_| |   /\__ \ _|| |\/| | _|| |_\ V /
 \___\___/ \___/|_|_\|___/___|_|  |_|___|____|_|

    Exercise Runner
"#;
    println!("{}", banner);
}
