use fnshim::AdapterConfig;

pub fn show(config: &AdapterConfig) -> anyhow::Result<()> {
    print!("{}", config.to_toml_string()?);
    Ok(())
}
