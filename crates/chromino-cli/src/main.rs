mod command;
mod generator;
mod session;

fn main() -> anyhow::Result<()> {
    command::run()
}
