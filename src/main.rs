fn main() -> anyhow::Result<()> {
    convo_viewer::cli::run()
}
