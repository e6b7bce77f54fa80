use console::{style, StyledObject};

pub fn url<D>(msg: D) -> StyledObject<D> {
    style(msg).blue().bold()
}

pub fn highlight<D>(msg: D) -> StyledObject<D> {
    style(msg).yellow().bold()
}

pub fn bold<D>(msg: D) -> StyledObject<D> {
    style(msg).bold()
}
