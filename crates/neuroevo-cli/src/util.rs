use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::Path,
};

use anyhow::Context;

use crate::schema::champion::ChampionModel;

/// Writes `value` as pretty JSON to `output_path`, or to stdout when it is `None`.
pub fn save_json<T>(value: &T, output_path: Option<&Path>) -> anyhow::Result<()>
where
    T: serde::Serialize,
{
    match output_path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            write_json(BufWriter::new(file), value)
                .with_context(|| format!("Failed to write JSON to {}", path.display()))
        }
        None => write_json(io::stdout().lock(), value).context("Failed to write JSON to stdout"),
    }
}

fn write_json<W, T>(mut writer: W, value: &T) -> anyhow::Result<()>
where
    W: Write,
    T: serde::Serialize,
{
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Loads a JSON document; `what` names it in error messages.
pub fn load_json<T, P>(what: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("cannot open {what} at {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("{} is not a valid {what}", path.display()))
}

/// Loads a champion and checks that its network matches its recorded configuration.
pub fn read_champion_file<P>(path: P) -> anyhow::Result<ChampionModel>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let model: ChampionModel = load_json("champion model", path)?;
    model
        .check()
        .with_context(|| format!("inconsistent champion model in {}", path.display()))?;
    Ok(model)
}
