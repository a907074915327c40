use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    career_transitions::apps::run_career_report(std::env::args().skip(1))
}
