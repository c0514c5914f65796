mod elimination;
mod refine;
mod scheduler;
