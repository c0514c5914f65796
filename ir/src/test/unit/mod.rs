mod dump;
mod layer;
