mod drain;
mod handoff;
