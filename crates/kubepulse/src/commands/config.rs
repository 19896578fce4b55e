use kubepulse_core::PulseConfig;

pub fn show(config: &PulseConfig) -> anyhow::Result<()> {
    print!("{}", config.to_toml_string()?);
    Ok(())
}
