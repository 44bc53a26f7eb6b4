mod apply;
mod check;
mod eval;
