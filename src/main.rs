fn main() -> anyhow::Result<()> {
    notes_store::cli::run()
}
