//! # Zhisheng Storefront Entry Point
//!
//! Headless run of the storefront runtime: loads config and the persisted
//! store, initializes a page and reports the cart state. The setup lives in
//! `lib.rs`.

fn main() {
    if let Err(e) = zhisheng_storefront::run() {
        eprintln!("zhisheng-storefront: {}", e);
        std::process::exit(1);
    }
}
