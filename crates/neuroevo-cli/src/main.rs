mod command;
mod environment;
mod schema;
mod util;

fn main() -> anyhow::Result<()> {
    command::run()
}
