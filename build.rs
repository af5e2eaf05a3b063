use std::path::Path;

const PLACEHOLDER: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>Prompt Forge</title>
    <style>
        body { font-family: system-ui; max-width: 40rem; margin: 4rem auto; background: #111827; color: #e5e7eb; }
        code { background: #374151; padding: 2px 6px; border-radius: 4px; }
    </style>
</head>
<body>
    <h1>Prompt Forge</h1>
    <p>The forwarding API is running. No UI bundle was embedded in this build.</p>
    <p>Send requests to <code>POST /api/forward</code> with
       <code>{"targetUrl", "apiKey", "method", "body"}</code>.</p>
    <p>To embed a UI, place its built files in <code>frontend/</code> and rebuild.</p>
</body>
</html>
"#;

fn main() {
    println!("cargo:rerun-if-changed=frontend/");

    // rust-embed needs the folder to exist at compile time.
    let frontend = Path::new("frontend");
    if !frontend.join("index.html").exists() {
        println!("cargo:warning=frontend/index.html not found, embedding placeholder page");
        std::fs::create_dir_all(frontend).ok();
        std::fs::write(frontend.join("index.html"), PLACEHOLDER).ok();
    }
}
