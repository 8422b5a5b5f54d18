//! Upload promise example for promise-registry.
//!
//! Demonstrates:
//! - Declaring a promise type with `define_promise!`
//! - Fulfilling events before and after callbacks are registered
//! - Stacking a second layer on top of the first
//! - Reporting a failing callback through an error sink
//!
//! Run with: `cargo run --example upload_promise`

use promise_registry::{define_promise, set_default_sink, EventRegistry, PromiseLayer};
use std::rc::Rc;

#[derive(Debug)]
pub struct Uploader {
    pub file: &'static str,
}

define_promise! {
    /// Promise made by an [`Uploader`].
    pub struct UploadPromise: EventRegistry<Rc<Uploader>, u64> { success, error, complete }
}

define_promise! {
    /// Upload that also reports progress.
    pub struct ChunkedUpload: UploadPromise { progress }
}

fn main() {
    println!("=== promise-registry: Upload Promise ===\n");

    set_default_sink(|e: &(dyn std::error::Error + 'static)| {
        println!("   [sink] {e}");
    });

    let uploader = Rc::new(Uploader {
        file: "report.pdf",
    });
    let mut upload = ChunkedUpload::new(Some(uploader.clone()), None);

    // -------------------------------------------------------------------------
    // 1. Register first, fulfill later
    // -------------------------------------------------------------------------
    println!("1. Registering `progress` before any progress is made...");

    upload
        .progress(|call| {
            let uploader = call.producer().expect("producer set");
            println!("   {} at {} bytes", uploader.file, call.args()[0]);
            Ok(())
        })
        .expect("progress is declared");

    for bytes in [1024, 2048, 4096] {
        upload
            .fulfill("progress", vec![bytes])
            .expect("progress delivered");
    }

    // -------------------------------------------------------------------------
    // 2. Fulfill first, register later
    // -------------------------------------------------------------------------
    println!("\n2. Upload finishes before anyone listens...");

    upload.fulfill("success", vec![4096]).expect("cached");
    println!(
        "   pending success: {}",
        upload.registry().has_pending("success")
    );

    upload
        .success(|call| {
            println!("   late listener got {} bytes", call.args()[0]);
            Ok(())
        })
        .expect("pending fulfillment delivered");

    // -------------------------------------------------------------------------
    // 3. A failing callback, reported by the composer
    // -------------------------------------------------------------------------
    println!("\n3. A callback fails...");

    upload
        .complete(|_| Err("disk full".into()))
        .expect("complete is declared");

    let outcome = upload.fulfill("complete", vec![]).map(|_| ());
    if let Err(err) = outcome {
        let _ = upload.report_error(err);
    }

    // -------------------------------------------------------------------------
    // 4. Teardown
    // -------------------------------------------------------------------------
    println!("\n4. Tearing down...");

    upload.teardown();
    println!(
        "   torn down: {}, uploader references left: {}",
        upload.registry().is_torn_down(),
        Rc::strong_count(&uploader)
    );

    println!("\n=== Example completed ===");
}
