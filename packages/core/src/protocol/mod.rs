// Протокольный слой: бинарные форматы конвертов

pub mod wire;
