// Build metadata for `--version`, exposed through `shadow_rs::shadow!(build)`.
fn main() -> shadow_rs::SdResult<()> {
    shadow_rs::ShadowBuilder::builder().build()?;
    Ok(())
}
