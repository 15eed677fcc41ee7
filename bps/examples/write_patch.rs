//! Build a small patch by hand and apply it back

use bps::{ApplyConfig, PatchFile, PatchWriter};
use std::time::Instant;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filename = "example_patch.bps";

    let source: Vec<u8> = (0..64u8).cycle().take(4096).collect();
    let mut target = source.clone();
    target[100..108].copy_from_slice(b"PATCHED!");
    target.extend(std::iter::repeat(0xAB).take(1024));

    println!("Writing patch to '{filename}'...");
    let start = Instant::now();
    let mut writer = PatchWriter::new().with_metadata(r#"{"tool":"write_patch example"}"#);
    writer
        .source_read(100)?
        .target_read(b"PATCHED!")?
        .source_copy(108, 4096 - 108)?
        .target_read(&[0xAB])?
        // Run-length expand the last byte across the rest of the tail
        .target_copy(4096, 1023)?;
    let bytes = writer.finish(&source, &target);
    std::fs::write(filename, &bytes)?;
    println!(
        "Patch written in {:.3}ms ({} bytes for a {} byte target)",
        start.elapsed().as_secs_f64() * 1000.0,
        bytes.len(),
        target.len()
    );

    println!("Applying patch...");
    let start = Instant::now();
    let patch = PatchFile::open(filename)?;
    let output = patch.apply(&source, &ApplyConfig::default())?;
    println!(
        "Applied in {:.3}ms, target verified: {}",
        start.elapsed().as_secs_f64() * 1000.0,
        output.verified
    );
    assert_eq!(output.target, target);

    Ok(())
}
