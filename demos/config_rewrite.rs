use quill_json::dom::Parser;
use quill_json::to_string_pretty;

/// Load a configuration document, rewrite the window geometry, and print the
/// indented result
fn main() {
    let source = r#"{
        "app_name": "quill",
        "window_width": 600,
        "window_height": 400,
        "maximised": false
    }"#;

    let parser = Parser::default();
    let mut config = match parser.parse_str(source) {
        Ok(value) => value,
        Err(err) => {
            eprintln!("config load failed: {}", err);
            return;
        }
    };

    if let Ok(object) = config.as_object_mut() {
        object.insert("window_width", 800);
        object.insert("window_height", 600);
        object.insert("maximised", true);
        println!("app: {}", object.get_string("app_name", "unknown"));
        println!("width: {}", object.get_f64("window_width", 0.0));
    }

    println!("{}", to_string_pretty(&config, 2));
}
