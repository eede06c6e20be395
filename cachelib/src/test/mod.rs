mod files;
mod trace;
